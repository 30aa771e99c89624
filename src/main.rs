use clap::Parser;
use rotavault::cli::{validate_store_name, Cli, Commands};

fn main() {
    let cli = Cli::parse();

    // Validate the store name early to catch typos.
    if let Err(e) = validate_store_name(&cli.name) {
        rotavault::cli::output::error(&e.to_string());
        std::process::exit(1);
    }

    let result = match cli.command {
        Commands::Init => rotavault::cli::commands::init::execute(&cli),
        Commands::Add {
            ref label,
            ref value,
        } => rotavault::cli::commands::add::execute(&cli, label, value.as_deref()),
        Commands::Show { ref label } => rotavault::cli::commands::show::execute(&cli, label),
        Commands::List => rotavault::cli::commands::list::execute(&cli),
        Commands::Enroll { ref user_id } => {
            rotavault::cli::commands::enroll::execute(&cli, user_id)
        }
        Commands::Rotate { yes } => rotavault::cli::commands::rotate::execute(&cli, yes),
        Commands::Status => rotavault::cli::commands::status::execute(&cli),
        Commands::Unlock { force } => rotavault::cli::commands::unlock::execute(&cli, force),
        Commands::Audit { last, ref since } => {
            rotavault::cli::commands::audit_cmd::execute(&cli, last, since.as_deref())
        }
        Commands::Completions { ref shell } => {
            rotavault::cli::commands::completions::execute(shell)
        }
    };

    if let Err(e) = result {
        rotavault::cli::output::error(&e.to_string());
        std::process::exit(1);
    }
}
