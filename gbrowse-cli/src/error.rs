//! User-facing error reporting for the gbrowse CLI

use gbrowse_core::BrowseError;

/// Provide helpful error messages and suggestions
pub fn format_error_with_suggestions(error: &BrowseError) -> String {
    let mut message = error.to_string();

    match error {
        BrowseError::Config { .. } => {
            message.push_str(
                "\n\nSuggestions:\n\
                 • Check your gbrowse.toml configuration file\n\
                 • Use 'gbrowse config --example' to generate a sample configuration\n\
                 • Set general.database to the GFF3 file holding your features",
            );
        }

        BrowseError::InvalidInput { .. } => {
            message.push_str(
                "\n\nSuggestions:\n\
                 • Use a landmark name such as 'unc-9' or 'Sequence:chrI'\n\
                 • Give ranges as 'chrI:1000..2000', 'chrI:1,000-2,000' or 'chrI:1000,2000'\n\
                 • A trailing '*' matches every name with that prefix",
            );
        }

        BrowseError::Parse { source_name, .. } => {
            message.push_str(&format!(
                "\n\nSuggestions:\n\
                 • Check that {} is tab-separated GFF3 with nine columns\n\
                 • Compressed files must end in .gz",
                source_name
            ));
        }

        BrowseError::Database { .. } | BrowseError::Io(_) => {}
    }

    message
}

/// Print error with helpful suggestions and exit
pub fn print_error_and_exit(error: &anyhow::Error) -> ! {
    match error.downcast_ref::<BrowseError>() {
        Some(browse_error) => eprintln!("Error: {}", format_error_with_suggestions(browse_error)),
        None => eprintln!("Error: {:#}", error),
    }
    std::process::exit(1);
}
