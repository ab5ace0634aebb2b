//! Named filters for the common buckets, categories, and features.

use super::FilterSpec;
use crate::error::{Error, Result};

/// Preset name and the filter string it stands for.
pub const PRESETS: &[(&str, &str)] = &[
    ("es5", "es5"),
    ("es6", "es6"),
    ("es7", "es7"),
    // es6 categories
    ("es6_optimisation", "es6/optimisation"),
    ("es6_syntax", "es6/syntax"),
    ("es6_bindings", "es6/bindings"),
    ("es6_functions", "es6/functions"),
    ("es6_builtIns", "es6/built-ins"),
    ("es6_builtInExtensions", "es6/built-in extensions"),
    ("es6_subclassing", "es6/subclassing"),
    ("es6_misc", "es6/misc"),
    ("es6_annexB", "es6/annex b"),
    // es6 features
    ("properTailCalls", "es6//proper tail calls"),
    ("defaultFunctionParameters", "es6//default function parameters"),
    ("restParameters", "es6//rest parameters"),
    ("spreadOperator", r"es6//spread \(\.\.\.\) operator"),
    ("objectLiteralExtensions", "es6//object literal extensions"),
    ("forOfLoops", r"es6//for\.\.of loops"),
    ("octalAndBinaryLiterals", "es6//octal and binary literals"),
    ("templateStrings", "es6//template strings"),
    ("regExpYandUflags", r#"es6//RegExp "y" and "u" flags"#),
    ("destructuring", "es6//destructuring"),
    ("unicodeCodePointEscapes", "es6//Unicode code point escapes"),
    ("const", "es6//const"),
    ("let", "es6//let"),
    ("blockLevelFunctionDeclaration", "es6//block-level function declaration"),
    ("arrowFunctions", "es6//arrow functions"),
    ("class", "es6//class"),
    ("super", "es6//super"),
    ("generators", "es6//generators"),
    ("typedArrays", "es6//typed arrays"),
    ("map", "es6//Map"),
    ("set", "es6//Set"),
    ("miscellaneous", "es6//miscellaneous"),
];

/// Resolve a preset by name.
pub fn preset(name: &str) -> Result<FilterSpec> {
    PRESETS
        .iter()
        .find(|(preset_name, _)| *preset_name == name)
        .ok_or_else(|| Error::UnknownPreset(name.to_string()))
        .and_then(|(_, filter)| filter.parse())
}
