use clap::Parser;
use facetdrill::cli::commands::{collect_params, collect_specs, Cli, Commands};
use facetdrill::config::AppConfig;
use facetdrill::FacetDrill;

fn main() {
    let cli = Cli::parse();
    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };
    config.logging.init();

    let fd = match FacetDrill::new(&config.db_path) {
        Ok(fd) => fd,
        Err(e) => {
            eprintln!("Error initializing FacetDrill: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = run_command(&fd, &config, cli.command) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn run_command(fd: &FacetDrill, config: &AppConfig, cmd: Commands) -> Result<(), Box<dyn std::error::Error>> {
    match cmd {
        Commands::Add { json } => {
            let record = fd.add_record_json(&json)?;
            println!("{}", serde_json::to_string_pretty(&record)?);
        }
        Commands::Browse {
            params,
            query,
            date_fields,
            values_fields,
            many_fields,
            limit,
        } => {
            let params = collect_params(query.as_deref(), &params)?;
            let specs = collect_specs(config, &date_fields, &values_fields, &many_fields)?;
            let result = fd.browse(&specs, &params, Some(limit))?;
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        Commands::Stats => {
            let stats = fd.stats()?;
            println!("{}", serde_json::to_string_pretty(&stats)?);
        }
    }
    Ok(())
}
