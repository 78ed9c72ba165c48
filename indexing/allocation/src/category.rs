use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, Copy, serde::Serialize, serde::Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Species {
    Human,
    Mouse,
}

impl Species {
    /// Resolves a free-text species field, e.g. `Homo sapiens`, `mouse`, `Hs`.
    ///
    /// The `hs`/`mm` abbreviations only match as whole words, otherwise any word containing
    /// them would resolve, e.g. `mammal`.
    pub fn from_free_text(value: &str) -> Option<Self> {
        let value = value.to_lowercase();
        let has_word = |word: &str| {
            value
                .split(|c: char| !c.is_ascii_alphanumeric())
                .any(|candidate| candidate == word)
        };

        if value.contains("human") || value.contains("homo sapiens") || has_word("hs") {
            Some(Species::Human)
        } else if value.contains("mouse") || value.contains("mus musculus") || has_word("mm") {
            Some(Species::Mouse)
        } else {
            None
        }
    }

    pub fn keyword(&self) -> &'static str {
        match self {
            Species::Human => "human",
            Species::Mouse => "mouse",
        }
    }
}

impl Display for Species {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.keyword())
    }
}

#[derive(Debug, Clone, Copy, serde::Serialize, serde::Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TcrChain {
    Alpha,
    Beta,
}

impl TcrChain {
    pub fn keyword(&self) -> &'static str {
        match self {
            TcrChain::Alpha => "alpha",
            TcrChain::Beta => "beta",
        }
    }
}

impl Display for TcrChain {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.keyword())
    }
}

/// Closed enumeration of the sample protocol categories the allocation rules care about.
///
/// Resolved from the free-text recipe exactly once, when a sample batch is ingested; the
/// engine never inspects recipe text itself.
#[derive(Debug, Clone, Copy, serde::Serialize, serde::Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SampleCategory {
    Dna,
    Rna,
    /// Amplification-based assay; fixed adapter volume, no dilution, reserved adapters.
    Amplicon,
    CrisprScreen,
    SingleCellCnv,
    /// Immune-repertoire protocol; adapter choice is species- and chain-restricted.
    Tcr { species: Species, chain: TcrChain },
}

impl SampleCategory {
    /// Resolves the category from the sample's recipe and species fields.
    ///
    /// A TCR recipe that does not name a chain, or whose species cannot be resolved, falls
    /// back to the plain RNA category so the sample still allocates from the general pool.
    pub fn resolve(recipe: &str, species: Option<Species>) -> Self {
        let recipe = recipe.to_lowercase();

        if recipe.contains("amplicon") {
            return SampleCategory::Amplicon;
        }
        if recipe.contains("crispr") {
            return SampleCategory::CrisprScreen;
        }
        if recipe.contains("cnv") {
            return SampleCategory::SingleCellCnv;
        }
        if recipe.contains("tcr") {
            let chain = if recipe.contains("alpha") {
                Some(TcrChain::Alpha)
            } else if recipe.contains("beta") {
                Some(TcrChain::Beta)
            } else {
                None
            };

            match (species, chain) {
                (Some(species), Some(chain)) => {
                    return SampleCategory::Tcr {
                        species,
                        chain,
                    }
                }
                _ => return SampleCategory::Rna,
            }
        }
        if recipe.contains("rna") {
            return SampleCategory::Rna;
        }

        SampleCategory::Dna
    }

    /// Amplicon/CRISPR/single-cell-CNV samples must draw from the reserved adapter set.
    pub fn uses_reserved_adapters(&self) -> bool {
        matches!(
            self,
            SampleCategory::Amplicon | SampleCategory::CrisprScreen | SampleCategory::SingleCellCnv
        )
    }

    /// RNA-derived protocols use fixed dilution values.
    pub fn is_rna_family(&self) -> bool {
        matches!(self, SampleCategory::Rna | SampleCategory::Tcr { .. })
    }

    pub fn is_special_protocol(&self) -> bool {
        matches!(self, SampleCategory::Amplicon)
    }
}

impl Display for SampleCategory {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            SampleCategory::Dna => f.write_str("DNA"),
            SampleCategory::Rna => f.write_str("RNA"),
            SampleCategory::Amplicon => f.write_str("Amplicon"),
            SampleCategory::CrisprScreen => f.write_str("CRISPR screen"),
            SampleCategory::SingleCellCnv => f.write_str("Single-cell CNV"),
            SampleCategory::Tcr {
                species,
                chain,
            } => write!(f, "TCR ({} {})", species, chain),
        }
    }
}
