//! Parser plugin names.
//!
//! Dialect plugins (`jsx`, `flow`, `typescript`, `estree`) install hooks;
//! the rest gate individual syntax proposals.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Plugin {
    Jsx,
    Flow,
    Typescript,
    Estree,
    AsyncGenerators,
    BigInt,
    ClassPrivateMethods,
    ClassPrivateProperties,
    ClassProperties,
    Decorators,
    DoExpressions,
    DynamicImport,
    ExportDefaultFrom,
    ExportNamespaceFrom,
    FunctionBind,
    FunctionSent,
    ImportMeta,
    LogicalAssignment,
    NullishCoalescingOperator,
    NumericSeparator,
    ObjectRestSpread,
    OptionalCatchBinding,
    OptionalChaining,
    ThrowExpressions,
}

impl Plugin {
    pub const ALL: [Plugin; 24] = [
        Plugin::Jsx,
        Plugin::Flow,
        Plugin::Typescript,
        Plugin::Estree,
        Plugin::AsyncGenerators,
        Plugin::BigInt,
        Plugin::ClassPrivateMethods,
        Plugin::ClassPrivateProperties,
        Plugin::ClassProperties,
        Plugin::Decorators,
        Plugin::DoExpressions,
        Plugin::DynamicImport,
        Plugin::ExportDefaultFrom,
        Plugin::ExportNamespaceFrom,
        Plugin::FunctionBind,
        Plugin::FunctionSent,
        Plugin::ImportMeta,
        Plugin::LogicalAssignment,
        Plugin::NullishCoalescingOperator,
        Plugin::NumericSeparator,
        Plugin::ObjectRestSpread,
        Plugin::OptionalCatchBinding,
        Plugin::OptionalChaining,
        Plugin::ThrowExpressions,
    ];

    /// The name used in options and error messages.
    pub fn name(self) -> &'static str {
        match self {
            Plugin::Jsx => "jsx",
            Plugin::Flow => "flow",
            Plugin::Typescript => "typescript",
            Plugin::Estree => "estree",
            Plugin::AsyncGenerators => "asyncGenerators",
            Plugin::BigInt => "bigInt",
            Plugin::ClassPrivateMethods => "classPrivateMethods",
            Plugin::ClassPrivateProperties => "classPrivateProperties",
            Plugin::ClassProperties => "classProperties",
            Plugin::Decorators => "decorators",
            Plugin::DoExpressions => "doExpressions",
            Plugin::DynamicImport => "dynamicImport",
            Plugin::ExportDefaultFrom => "exportDefaultFrom",
            Plugin::ExportNamespaceFrom => "exportNamespaceFrom",
            Plugin::FunctionBind => "functionBind",
            Plugin::FunctionSent => "functionSent",
            Plugin::ImportMeta => "importMeta",
            Plugin::LogicalAssignment => "logicalAssignment",
            Plugin::NullishCoalescingOperator => "nullishCoalescingOperator",
            Plugin::NumericSeparator => "numericSeparator",
            Plugin::ObjectRestSpread => "objectRestSpread",
            Plugin::OptionalCatchBinding => "optionalCatchBinding",
            Plugin::OptionalChaining => "optionalChaining",
            Plugin::ThrowExpressions => "throwExpressions",
        }
    }

    /// Whether the syntax is standard and the plugin is accepted but has no effect.
    pub fn is_always_on(self) -> bool {
        matches!(self, Plugin::AsyncGenerators | Plugin::ObjectRestSpread)
    }
}

impl fmt::Display for Plugin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A set of enabled plugins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct PluginSet(u32);

impl PluginSet {
    pub fn new() -> Self {
        Self(0)
    }

    #[inline]
    pub fn insert(&mut self, plugin: Plugin) {
        self.0 |= 1 << plugin as u32;
    }

    #[inline]
    pub fn contains(self, plugin: Plugin) -> bool {
        plugin.is_always_on() || self.0 & (1 << plugin as u32) != 0
    }

    /// The enabled plugins, in declaration order.
    pub fn iter(self) -> impl Iterator<Item = Plugin> {
        Plugin::ALL.into_iter().filter(move |p| self.0 & (1 << *p as u32) != 0)
    }
}

impl FromIterator<Plugin> for PluginSet {
    fn from_iter<I: IntoIterator<Item = Plugin>>(iter: I) -> Self {
        let mut set = PluginSet::new();
        for plugin in iter {
            set.insert(plugin);
        }
        set
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plugin_set() {
        let set: PluginSet = [Plugin::Jsx, Plugin::BigInt].into_iter().collect();
        assert!(set.contains(Plugin::Jsx));
        assert!(!set.contains(Plugin::Flow));
        assert!(set.contains(Plugin::ObjectRestSpread));
        assert_eq!(set.iter().collect::<Vec<_>>(), vec![Plugin::Jsx, Plugin::BigInt]);
    }

    #[test]
    fn test_plugin_names_round_trip_through_serde_names() {
        for plugin in Plugin::ALL {
            let json = format!("\"{}\"", plugin.name());
            let parsed: Plugin = serde_json::from_str(&json).unwrap();
            assert_eq!(parsed, plugin);
        }
    }
}
