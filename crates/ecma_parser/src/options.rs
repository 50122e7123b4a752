//! Parser options.
//!
//! Options deserialize from the same JSON object shape the reference tool
//! accepts, so a caller can forward a config file or a CLI flag verbatim.

use ecma_ast::SourceType;
use ecma_core::text::Position;
use ecma_diagnostics::{messages, ParseResult, SyntaxError};
use ecma_scanner::{Plugin, PluginSet};
use serde::{Deserialize, Serialize};

/// Options controlling how a source text is parsed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ParserOptions {
    pub source_type: SourceType,
    pub source_filename: Option<String>,
    /// Line number of the first line of input.
    pub start_line: u32,

    // -- Relaxed checks --
    pub allow_await_outside_function: bool,
    pub allow_return_outside_function: bool,
    pub allow_import_export_everywhere: bool,
    pub allow_super_outside_method: bool,
    /// Force strict mode on or off. `None` means strict iff module.
    pub strict_mode: Option<bool>,

    // -- Output --
    pub ranges: bool,
    pub tokens: bool,
    pub create_parenthesized_expressions: bool,

    pub plugins: Vec<Plugin>,
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self {
            source_type: SourceType::Script,
            source_filename: None,
            start_line: 1,
            allow_await_outside_function: false,
            allow_return_outside_function: false,
            allow_import_export_everywhere: false,
            allow_super_outside_method: false,
            strict_mode: None,
            ranges: false,
            tokens: false,
            create_parenthesized_expressions: false,
            plugins: Vec::new(),
        }
    }
}

impl ParserOptions {
    /// Read options from a JSON object such as
    /// `{"sourceType": "module", "plugins": ["jsx"]}`.
    pub fn from_json(json: &str) -> ParseResult<Self> {
        serde_json::from_str(json).map_err(|err| {
            SyntaxError::new(
                &messages::INVALID_OPTIONS,
                &[&err.to_string()],
                0,
                Position::new(1, 0),
            )
        })
    }

    pub fn with_source_type(mut self, source_type: SourceType) -> Self {
        self.source_type = source_type;
        self
    }

    pub fn with_plugins(mut self, plugins: impl IntoIterator<Item = Plugin>) -> Self {
        self.plugins.extend(plugins);
        self
    }

    pub fn has_plugin(&self, plugin: Plugin) -> bool {
        self.plugin_set().contains(plugin)
    }

    pub fn plugin_set(&self) -> PluginSet {
        self.plugins.iter().copied().collect()
    }

    /// Whether the input starts out in strict mode.
    pub fn is_strict(&self, in_module: bool) -> bool {
        self.strict_mode.unwrap_or(in_module)
    }

    /// Reject plugin sets that cannot be combined.
    pub fn validate(&self) -> ParseResult<()> {
        let plugins = self.plugin_set();
        if plugins.contains(Plugin::Flow) && plugins.contains(Plugin::Typescript) {
            return Err(SyntaxError::new(
                &messages::INVALID_PLUGIN_COMBINATION,
                &["flow", "typescript"],
                0,
                Position::new(self.start_line, 0),
            ));
        }
        Ok(())
    }
}
