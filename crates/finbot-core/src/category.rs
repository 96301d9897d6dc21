//! Expense categories and free-text synonym resolution.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The fixed set of expense categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Alimentacao,
    Transporte,
    Moradia,
    Saude,
    Educacao,
    Lazer,
    Outros,
}

/// All categories, in display order.
pub const ALL_CATEGORIES: [Category; 7] = [
    Category::Alimentacao,
    Category::Moradia,
    Category::Educacao,
    Category::Saude,
    Category::Transporte,
    Category::Lazer,
    Category::Outros,
];

impl Category {
    /// Canonical backend name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Alimentacao => "alimentacao",
            Self::Transporte => "transporte",
            Self::Moradia => "moradia",
            Self::Saude => "saude",
            Self::Educacao => "educacao",
            Self::Lazer => "lazer",
            Self::Outros => "outros",
        }
    }

    /// Emoji used in message templates.
    pub fn emoji(&self) -> &'static str {
        match self {
            Self::Alimentacao => "🍱",
            Self::Transporte => "🚕",
            Self::Moradia => "🏠",
            Self::Saude => "🧑🏻‍⚕️",
            Self::Educacao => "📖",
            Self::Lazer => "🎰",
            Self::Outros => "💸",
        }
    }

    /// Display label with accents.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Alimentacao => "Alimentação",
            Self::Transporte => "Transporte",
            Self::Moradia => "Moradia",
            Self::Saude => "Saúde",
            Self::Educacao => "Educação",
            Self::Lazer => "Lazer",
            Self::Outros => "Outros",
        }
    }

    /// Resolve free text to a category via the synonym table.
    ///
    /// Total and deterministic: every input maps to exactly one category,
    /// unknown input always to `Outros`.
    pub fn from_text(text: &str) -> Self {
        let normalized = crate::phone::strip_accents(text).to_lowercase();
        let normalized = normalized.trim();

        for (category, synonyms) in SYNONYMS {
            if synonyms.contains(&normalized) {
                return *category;
            }
        }

        Self::Outros
    }

    /// Resolve a canonical backend name back to a category, if it is one
    /// of the seven.
    pub fn from_name(name: &str) -> Option<Self> {
        ALL_CATEGORIES.into_iter().find(|c| c.name() == name)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Synonym table mapping user vocabulary to a category.
const SYNONYMS: &[(Category, &[&str])] = &[
    (
        Category::Alimentacao,
        &["alimentacao", "comida", "almoco", "jantar", "lanche"],
    ),
    (
        Category::Transporte,
        &["transporte", "uber", "taxi", "onibus", "gasolina"],
    ),
    (
        Category::Moradia,
        &["moradia", "aluguel", "condominio", "luz", "agua"],
    ),
    (
        Category::Saude,
        &["saude", "remedio", "farmacia", "consulta", "medico"],
    ),
    (
        Category::Educacao,
        &["educacao", "curso", "livro", "mensalidade"],
    ),
    (
        Category::Lazer,
        &["lazer", "cinema", "streaming", "viagem", "show"],
    ),
    (Category::Outros, &["outros", "diverso"]),
];
