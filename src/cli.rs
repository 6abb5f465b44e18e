use crate::config::GeneratorOptions;
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "blockgen",
    about = "Generate Rust source from a block-editor workspace (.json or .xml)."
)]
pub struct Args {
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    #[arg(value_name = "OUTPUT", help = "Write generated code here instead of stdout.")]
    pub output: Option<PathBuf>,

    #[arg(
        long,
        value_name = "CODE",
        help = "Code inserted before every statement. '%1' becomes the quoted block id."
    )]
    pub statement_prefix: Option<String>,

    #[arg(
        long,
        value_name = "CODE",
        help = "Code inserted after every statement. '%1' becomes the quoted block id."
    )]
    pub statement_suffix: Option<String>,

    #[arg(
        long,
        value_name = "CODE",
        help = "Code inserted at the top of every loop body. '%1' becomes the quoted block id."
    )]
    pub loop_trap: Option<String>,

    #[arg(
        long = "developer-var",
        value_name = "NAME",
        help = "Reserve and declare an extra variable name (repeatable)."
    )]
    pub developer_vars: Vec<String>,

    #[arg(long, help = "Load and generate without writing any output.")]
    pub check: bool,
}

impl Args {
    pub fn generator_options(&self) -> GeneratorOptions {
        GeneratorOptions {
            statement_prefix: self.statement_prefix.clone(),
            statement_suffix: self.statement_suffix.clone(),
            loop_trap: self.loop_trap.clone(),
            developer_variables: self.developer_vars.clone(),
        }
    }
}
