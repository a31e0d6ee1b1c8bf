/// Pipeline options for a compilation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Dump the AST through `tracing` after parsing and after resolution.
    pub print_ast: bool,
    /// Name of the module-level function that becomes the program entry point.
    pub entry_point: String,
}

impl Default for Config {
    fn default() -> Self {
        Self { print_ast: false, entry_point: "main".to_owned() }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_print_ast(mut self, print_ast: bool) -> Self {
        self.print_ast = print_ast;
        self
    }

    pub fn with_entry_point(mut self, name: impl Into<String>) -> Self {
        self.entry_point = name.into();
        self
    }
}
