use std::{net::IpAddr, process::ExitCode, time::Duration};

use camino::Utf8PathBuf;
use clap::{ArgAction, ArgMatches, arg};
use daenes::{
    Config, Outcome, codec,
    rr::{Name, TimeToLive},
    source::DomainSource as _,
};
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    match daenes() {
        Ok(_) => ExitCode::SUCCESS,
        Err(_) => ExitCode::FAILURE,
    }
}

fn daenes() -> Result<(), ()> {
    tracing_subscriber::fmt()
        .compact()
        .with_env_filter(
            EnvFilter::try_from_env("LOG_LEVEL").unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cycle_args = [
        arg!(--"dns-ip" <ADDRESS> "Address published for ns.<parent> in every zone")
            .env("DNS_IP")
            .required(true)
            .value_parser(clap::value_parser!(IpAddr)),
        arg!(--"dns-ttl" <SECONDS> "TTL of every generated record")
            .env("DNS_TTL")
            .default_value("3600")
            .value_parser(clap::value_parser!(u32)),
        arg!(--"zones-dir" <PATH> "Directory holding the generated zone files")
            .env("ZONES_DIR")
            .default_value(Config::DEFAULT_ZONES_DIR)
            .value_parser(clap::value_parser!(Utf8PathBuf)),
        arg!(--domains <PATH> "JSON document listing the discovered domain records")
            .env("DOMAINS_FILE")
            .required(true)
            .value_parser(clap::value_parser!(Utf8PathBuf)),
        arg!(--prune "Remove zone files of parent domains that are no longer discovered")
            .env("PRUNE")
            .action(ArgAction::SetTrue),
    ];

    let app = clap::Command::new("daenes")
        .about("Generate DNS zone files from discovered container endpoints")
        .subcommand_required(true)
        .subcommand(
            clap::Command::new("run")
                .about("Update zone files every interval until interrupted")
                .args(cycle_args.clone())
                .arg(
                    arg!(--interval <SECONDS> "Pause between two update cycles")
                        .env("INTERVAL")
                        .required(true)
                        .value_parser(clap::value_parser!(u64)),
                ),
        )
        .subcommand(
            clap::Command::new("update")
                .about("Run a single update cycle")
                .args(cycle_args),
        )
        .subcommand(
            clap::Command::new("show")
                .about("Parse a zone file and print it in canonical form")
                .arg(
                    arg!(<ZONE> "Zone file to read")
                        .value_parser(clap::value_parser!(Utf8PathBuf)),
                )
                .arg(arg!(<ORIGIN> "Origin of the zone").value_parser(clap::value_parser!(Name))),
        );

    let args = app.get_matches();

    match args.subcommand() {
        Some(("run", matches)) => {
            let mut config = config(matches);
            config.interval = Duration::from_secs(
                *matches
                    .get_one::<u64>("interval")
                    .expect("interval is required"),
            );
            if let Err(error) = run(config) {
                eprintln!("Error running update loop");
                eprintln!("{error}");
                return Err(());
            }
        }
        Some(("update", matches)) => {
            let config = config(matches);
            match cycle(&config) {
                Ok(Outcome::Complete) => {}
                Ok(outcome) => {
                    eprintln!("Update cycle finished: {outcome:?}");
                    return Err(());
                }
                Err(error) => {
                    eprintln!("Error reading domains");
                    eprintln!("{error}");
                    return Err(());
                }
            }
        }
        Some(("show", matches)) => {
            let zone_file = matches
                .get_one::<Utf8PathBuf>("ZONE")
                .expect("ZONE is required");
            let origin = matches
                .get_one::<Name>("ORIGIN")
                .expect("ORIGIN is required");
            match codec::read_zone_file(zone_file, &fqdn(origin)) {
                Ok(zone) => print!("{}", codec::to_text(&zone)),
                Err(error) => {
                    eprintln!("Error loading zone from {zone_file}:");
                    eprintln!("{error}");
                    return Err(());
                }
            }
        }
        _ => unreachable!("clap crimes?"),
    }

    Ok(())
}

fn config(matches: &ArgMatches) -> Config {
    let resolver = matches
        .get_one::<IpAddr>("dns-ip")
        .expect("dns-ip is required");
    let domains = matches
        .get_one::<Utf8PathBuf>("domains")
        .expect("domains is required");

    let mut config = Config::new(*resolver, domains.clone());
    if let Some(ttl) = matches.get_one::<u32>("dns-ttl") {
        config.ttl = TimeToLive::from_secs(*ttl);
    }
    if let Some(zones_dir) = matches.get_one::<Utf8PathBuf>("zones-dir") {
        config.zones_dir = zones_dir.clone();
    }
    config.prune = matches.get_flag("prune");
    config
}

fn fqdn(name: &Name) -> Name {
    let mut name = name.clone();
    name.set_fqdn(true);
    name
}

/// One update cycle. Group failures are logged by the updater and reflected in the outcome.
fn cycle(config: &Config) -> Result<Outcome, Box<dyn std::error::Error>> {
    let domains = config.domain_source().domains()?;
    let updater = config.updater();
    let report = updater.update_all(domains);

    if config.prune {
        match updater.prune_stale(&report) {
            Ok(removed) if !removed.is_empty() => {
                tracing::info!("Pruned {} stale zones", removed.len());
            }
            Ok(_) => {}
            Err(error) => tracing::error!("Failed to prune stale zones: {error}"),
        }
    }

    let outcome = report.outcome();
    tracing::info!(
        "Updated {} zones, {} failed",
        report.zones().len(),
        report.failures().len()
    );
    Ok(outcome)
}

fn run(config: Config) -> Result<(), Box<dyn std::error::Error>> {
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    rt.block_on(async {
        tracing::info!(
            "Updating zones in {} every {:?}",
            config.zones_dir,
            config.interval
        );

        loop {
            if let Err(error) = cycle(&config) {
                tracing::error!("Update cycle failed: {error}");
            }

            tokio::select! {
                _ = tokio::time::sleep(config.interval) => {}
                _ = tokio::signal::ctrl_c() => {
                    tracing::info!("Interrupted, stopping");
                    break;
                }
            }
        }

        Ok(())
    })
}
