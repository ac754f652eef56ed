use std::{
    error::Error,
    io::{self},
    path::Path,
    process::exit,
};

use clap::Parser;
use rusqlite::Connection;

use credit_tracker::{CredentialHash, create_business_owner, initialize_db};

/// A utility for adding a business owner to the credit_tracker database.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to the application SQLite database. It is created if it does not exist.
    #[arg(long)]
    db_path: String,

    /// The new owner's user name.
    #[arg(long)]
    username: String,
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    let db_path = Path::new(&args.db_path);
    validate_db_path(db_path);

    let credential = match get_new_credential_hash() {
        Some(credential) => credential,
        None => return Ok(()),
    };

    let conn = Connection::open(db_path)?;
    initialize_db(&conn)?;
    let owner = create_business_owner(&args.username, credential, &conn)?;

    println!("Created business owner {} with ID {}", owner.username, owner.id);

    Ok(())
}

fn validate_db_path(db_path: &Path) {
    match db_path.extension() {
        Some(extension) if !extension.is_empty() => {}
        _ => {
            print_error("Database path must include a file extension (e.g., 'credit.db').");
            exit(1);
        }
    }
}

fn get_new_credential_hash() -> Option<CredentialHash> {
    loop {
        println!();

        let first_credential = prompt("Enter a password for the new owner: ")?;

        if first_credential.is_empty() {
            print_error("Password must not be empty, try again.");
            continue;
        }

        let second_credential = prompt("Enter the same password again: ")?;

        if first_credential != second_credential {
            print_error("Passwords must match, try again.");
            continue;
        }

        match CredentialHash::from_plaintext(&first_credential, CredentialHash::DEFAULT_COST) {
            Ok(credential) => return Some(credential),
            Err(error) => {
                print_error(format!("Could not hash password: {error}. Try again."));
                continue;
            }
        }
    }
}

/// Read a line from the terminal without echoing it. Returns `None` on EOF or a read error.
fn prompt(message: &str) -> Option<String> {
    match rpassword::prompt_password(message) {
        Ok(string) => Some(string),
        Err(error) if error.kind() == io::ErrorKind::UnexpectedEof => None,
        Err(error) => {
            print_error(format!("Could not read password from stdin: {error}"));
            None
        }
    }
}

fn print_error(error: impl ToString) {
    eprintln!(
        "\x1b[31;1m{}\x1b[0m",
        capitalise_first_char(&error.to_string())
    )
}

fn capitalise_first_char(string: &str) -> String {
    let mut chars = string.chars();
    let Some(first) = chars.next() else {
        return String::with_capacity(0);
    };
    first.to_uppercase().chain(chars).collect()
}
