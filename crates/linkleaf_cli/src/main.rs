//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `linkleaf_core` wiring end to end: logging, migrations, insert.
//! - Keep output deterministic for quick local sanity checks.
//!
//! Usage: `linkleaf_cli [DB_PATH|:memory:] [NAME]`

use linkleaf_core::db::{open_db, open_db_in_memory};
use linkleaf_core::{LoggingConfig, Person, PersonRepository, SqlitePersonRepository};
use log::info;
use std::error::Error;
use std::process::ExitCode;

const IN_MEMORY: &str = ":memory:";

fn main() -> ExitCode {
    match run(std::env::args().skip(1).collect()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("linkleaf_cli error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Vec<String>) -> Result<(), Box<dyn Error>> {
    if let Some(config) = LoggingConfig::from_env() {
        config.init()?;
    }

    let db_path = args.first().map(String::as_str).unwrap_or(IN_MEMORY);
    let name = args.get(1).cloned();

    let conn = if db_path == IN_MEMORY {
        open_db_in_memory()?
    } else {
        open_db(db_path)?
    };
    let repo = SqlitePersonRepository::try_new(&conn)?;

    let mut person = Person::default();
    person.set_name(name);
    let id = repo.create_person(&mut person)?;
    let count = repo.count_persons()?;
    info!("event=cli_probe module=cli status=ok id={id} count={count}");

    println!("linkleaf_core version={}", linkleaf_core::core_version());
    println!("person id={id} name={}", person.name().unwrap_or("<null>"));
    println!("persons count={count}");
    Ok(())
}
