//! Table Schema Module
//! Column names and the explicit presence model for load-bearing columns.

pub const TSI_OC: &str = "TSI_OC";
pub const PREMIUM_GROSS: &str = "PREMIUM_GROSS";
pub const DISCOUNT: &str = "DISCOUNT";
pub const DISC_RATIO: &str = "Disc_Ratio";

pub const COB_DESC: &str = "COB_DESC";
pub const SEGMENT: &str = "SEGMENT";
pub const BRANCH_DESC: &str = "BRANCH_DESC";
pub const TOC_DESCRIPTION: &str = "TOC_DESCRIPTION";
pub const BRANCH: &str = "BRANCH";

/// Numeric measure columns. Always present after cleaning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Measure {
    TsiOc,
    PremiumGross,
    Discount,
}

impl Measure {
    pub const ALL: [Measure; 3] = [Measure::TsiOc, Measure::PremiumGross, Measure::Discount];

    pub const fn column_name(&self) -> &'static str {
        match self {
            Self::TsiOc => TSI_OC,
            Self::PremiumGross => PREMIUM_GROSS,
            Self::Discount => DISCOUNT,
        }
    }
}

/// Categorical columns. Advisory: each may be absent from a given source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Dimension {
    Cob,
    Segment,
    BranchDesc,
    Toc,
    /// Branch identifier, only used by the legacy active-branch count.
    BranchCode,
}

impl Dimension {
    pub const ALL: [Dimension; 5] = [
        Dimension::Cob,
        Dimension::Segment,
        Dimension::BranchDesc,
        Dimension::Toc,
        Dimension::BranchCode,
    ];

    /// Keys of the detail table, in display order.
    pub const DETAIL_KEYS: [Dimension; 3] =
        [Dimension::BranchDesc, Dimension::Cob, Dimension::Toc];

    pub const fn column_name(&self) -> &'static str {
        match self {
            Self::Cob => COB_DESC,
            Self::Segment => SEGMENT,
            Self::BranchDesc => BRANCH_DESC,
            Self::Toc => TOC_DESCRIPTION,
            Self::BranchCode => BRANCH,
        }
    }

    pub const fn label(&self) -> &'static str {
        match self {
            Self::Cob => "COB",
            Self::Segment => "Segment",
            Self::BranchDesc => "Branch",
            Self::Toc => "TOC Description",
            Self::BranchCode => "Branch Code",
        }
    }
}

/// Which load-bearing columns a cleaned table actually carries.
///
/// Measures are guaranteed (synthesized as zero when the source lacks them);
/// dimensions are advisory and consumers must check [`TableSchema::has`]
/// before relying on one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableSchema {
    dimensions: Vec<Dimension>,
    synthesized: Vec<Measure>,
}

impl TableSchema {
    pub fn new(dimensions: Vec<Dimension>, synthesized: Vec<Measure>) -> Self {
        Self {
            dimensions,
            synthesized,
        }
    }

    pub fn has(&self, dimension: Dimension) -> bool {
        self.dimensions.contains(&dimension)
    }

    /// True when the source had no such column and it was zero-filled.
    pub fn was_synthesized(&self, measure: Measure) -> bool {
        self.synthesized.contains(&measure)
    }

    /// Detail-table keys that exist in this table.
    pub fn detail_keys(&self) -> Vec<Dimension> {
        Dimension::DETAIL_KEYS
            .into_iter()
            .filter(|d| self.has(*d))
            .collect()
    }
}
