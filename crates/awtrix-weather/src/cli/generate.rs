//! `awtrix-weather generate`: interactive config builder.

use argh::FromArgs;
use std::path::Path;

use crate::generator::{write_output, GeneratorError, ScriptGenerator};

/// Interactively build a configuration file for `awtrix-weather run`
#[derive(FromArgs, Debug)]
#[argh(subcommand, name = "generate")]
pub struct GenerateCommand {
    /// output file (default: awtrix-weather.yaml)
    #[argh(option, short = 'o', default = "String::from(\"awtrix-weather.yaml\")")]
    pub output: String,

    /// overwrite the output file if it exists
    #[argh(switch)]
    pub force: bool,
}

impl GenerateCommand {
    pub fn run(&self) -> Result<(), GeneratorError> {
        let path = Path::new(&self.output);
        // Fail before the session rather than after all the typing.
        if path.exists() && !self.force {
            return Err(GeneratorError::OutputExists(self.output.clone()));
        }

        let mut generator = ScriptGenerator::new(std::io::stdin().lock(), std::io::stdout());
        let rendered = generator.generate()?;
        write_output(path, &rendered, self.force)?;

        println!("\nSuccessfully generated '{}'!", path.display());
        println!("Start publishing with:");
        println!("    awtrix-weather run -c {}", path.display());
        println!("Please review the file to ensure all settings are correct.");
        Ok(())
    }
}
