//! Shared types for the Edu-Supply engine.
//!
//! These types form the data model used across all modules: the three
//! fixed sectors, decision categories, the per-sector ledger, and the
//! institution session that the engine mutates. `LedgerError` is the
//! closed set of recoverable failures every engine call can return.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lowest value a sector's profit score can take.
pub const MIN_PROFIT_SCORE: i32 = 0;
/// Highest value a sector's profit score can take.
pub const MAX_PROFIT_SCORE: i32 = 200;
/// Score every sector starts with.
pub const INITIAL_PROFIT_SCORE: i32 = 100;
/// Largest capital that can be locked. Snapshots carry amounts as JSON
/// numbers (f64), which stay exact up to 15 significant digits: below this
/// bound that covers every amount at cent precision.
pub const MAX_CAPITAL: Decimal = dec!(10000000000000);

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Organisational bucket with independent spend and score tracking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Sector {
    Primary,
    Secondary,
    College,
}

impl Sector {
    /// All sectors in display order.
    pub const ALL: [Sector; 3] = [Sector::Primary, Sector::Secondary, Sector::College];
}

impl fmt::Display for Sector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sector::Primary => write!(f, "Primary"),
            Sector::Secondary => write!(f, "Secondary"),
            Sector::College => write!(f, "College"),
        }
    }
}

/// Parse a sector name (case-insensitive).
impl std::str::FromStr for Sector {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "primary" => Ok(Sector::Primary),
            "secondary" => Ok(Sector::Secondary),
            "college" => Ok(Sector::College),
            _ => Err(LedgerError::InvalidSector(s.to_string())),
        }
    }
}

/// Kind of decision a record captures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DecisionCategory {
    CapitalAllocation,
    MarketSelection,
    BuildVsBuy,
    InventoryRisk,
}

impl DecisionCategory {
    pub const ALL: [DecisionCategory; 4] = [
        DecisionCategory::CapitalAllocation,
        DecisionCategory::MarketSelection,
        DecisionCategory::BuildVsBuy,
        DecisionCategory::InventoryRisk,
    ];
}

impl fmt::Display for DecisionCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecisionCategory::CapitalAllocation => write!(f, "Capital Allocation"),
            DecisionCategory::MarketSelection => write!(f, "Market Selection"),
            DecisionCategory::BuildVsBuy => write!(f, "Build vs Buy"),
            DecisionCategory::InventoryRisk => write!(f, "Inventory Risk"),
        }
    }
}

/// Parse a category name. Case, spaces, dashes and underscores are ignored,
/// so "Build vs Buy", "build_vs_buy" and "BuildVsBuy" all match.
impl std::str::FromStr for DecisionCategory {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .map(|c| c.to_ascii_lowercase())
            .collect();
        match key.as_str() {
            "capitalallocation" | "capital" | "allocation" => Ok(DecisionCategory::CapitalAllocation),
            "marketselection" | "market" | "quotation" => Ok(DecisionCategory::MarketSelection),
            "buildvsbuy" | "buildorbuy" => Ok(DecisionCategory::BuildVsBuy),
            "inventoryrisk" | "inventory" => Ok(DecisionCategory::InventoryRisk),
            _ => Err(LedgerError::InvalidCategory(s.to_string())),
        }
    }
}

/// Whether a scored decision went the institution's way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    Favorable,
    Unfavorable,
}

impl Outcome {
    pub fn from_favorable(favorable: bool) -> Self {
        if favorable {
            Outcome::Favorable
        } else {
            Outcome::Unfavorable
        }
    }

    pub fn is_favorable(&self) -> bool {
        *self == Outcome::Favorable
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Favorable => write!(f, "favorable"),
            Outcome::Unfavorable => write!(f, "unfavorable"),
        }
    }
}

// ---------------------------------------------------------------------------
// Records & ledgers
// ---------------------------------------------------------------------------

/// One append-only entry in a sector's decision log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecisionRecord {
    pub category: DecisionCategory,
    pub label: String,
    pub amount: Decimal,
    #[serde(default)]
    pub notes: String,
    pub timestamp: DateTime<Utc>,
}

impl DecisionRecord {
    pub fn new(category: DecisionCategory, label: &str, amount: Decimal, notes: &str) -> Self {
        Self {
            category,
            label: label.to_string(),
            amount,
            notes: notes.to_string(),
            timestamp: Utc::now(),
        }
    }
}

impl fmt::Display for DecisionRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {} {} {:.2}",
            self.timestamp.format("%Y-%m-%d %H:%M"),
            self.category,
            self.label,
            self.amount,
        )?;
        if !self.notes.is_empty() {
            write!(f, " ({})", self.notes)?;
        }
        Ok(())
    }
}

/// Spend, score, and decision log for one sector.
#[derive(Debug, Clone, PartialEq)]
pub struct SectorLedger {
    pub spent: Decimal,
    pub profit_score: i32,
    pub records: Vec<DecisionRecord>,
}

impl Default for SectorLedger {
    fn default() -> Self {
        Self {
            spent: Decimal::ZERO,
            profit_score: INITIAL_PROFIT_SCORE,
            records: Vec::new(),
        }
    }
}

impl SectorLedger {
    /// Sum of record amounts for one category.
    pub fn total_for(&self, category: DecisionCategory) -> Decimal {
        self.records
            .iter()
            .filter(|r| r.category == category)
            .map(|r| r.amount)
            .sum()
    }
}

/// The three sector ledgers. Every sector is always present.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Sectors {
    pub primary: SectorLedger,
    pub secondary: SectorLedger,
    pub college: SectorLedger,
}

impl Sectors {
    pub fn get(&self, sector: Sector) -> &SectorLedger {
        match sector {
            Sector::Primary => &self.primary,
            Sector::Secondary => &self.secondary,
            Sector::College => &self.college,
        }
    }

    pub fn get_mut(&mut self, sector: Sector) -> &mut SectorLedger {
        match sector {
            Sector::Primary => &mut self.primary,
            Sector::Secondary => &mut self.secondary,
            Sector::College => &mut self.college,
        }
    }

    /// Iterate sectors in `Sector::ALL` order.
    pub fn iter(&self) -> impl Iterator<Item = (Sector, &SectorLedger)> {
        Sector::ALL.into_iter().map(move |s| (s, self.get(s)))
    }

    pub fn total_spent(&self) -> Decimal {
        self.iter().map(|(_, l)| l.spent).sum()
    }
}

// ---------------------------------------------------------------------------
// Institution session
// ---------------------------------------------------------------------------

/// Full in-memory state of one authenticated run.
#[derive(Debug, Clone, PartialEq)]
pub struct InstitutionSession {
    pub institution_name: String,
    pub total_capital: Decimal,
    pub capital_locked: bool,
    pub sectors: Sectors,
}

impl InstitutionSession {
    /// Fresh, unlocked session with default sector ledgers.
    pub fn new(institution_name: &str) -> Self {
        Self {
            institution_name: institution_name.to_string(),
            total_capital: Decimal::ZERO,
            capital_locked: false,
            sectors: Sectors::default(),
        }
    }
}

impl fmt::Display for InstitutionSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let spent = self.sectors.total_spent();
        write!(
            f,
            "{} | capital={:.2} ({}) | spent={:.2} | remaining={:.2}",
            self.institution_name,
            self.total_capital,
            if self.capital_locked { "locked" } else { "unlocked" },
            spent,
            self.total_capital - spent,
        )
    }
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Recoverable engine failures. A failed call never mutates the session.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LedgerError {
    #[error("Capital is already locked")]
    AlreadyLocked,

    #[error("Capital must be locked before recording spend or decisions")]
    NotLocked,

    #[error("Insufficient capital: requested {requested:.2}, remaining {remaining:.2}")]
    InsufficientCapital { requested: Decimal, remaining: Decimal },

    #[error("Malformed snapshot: {0}")]
    MalformedSnapshot(String),

    #[error("Unknown sector: {0}")]
    InvalidSector(String),

    #[error("Unknown decision category: {0}")]
    InvalidCategory(String),

    #[error("Invalid amount: {0}")]
    InvalidAmount(Decimal),

    #[error("Quality rating {0} is outside 1..=5")]
    InvalidRating(u8),

    #[error("No authenticated session")]
    Unauthenticated,

    #[error("Invalid license key")]
    InvalidCredential,
}

impl LedgerError {
    /// Stable machine-readable kind, used by the HTTP layer.
    pub fn kind(&self) -> &'static str {
        match self {
            LedgerError::AlreadyLocked => "AlreadyLocked",
            LedgerError::NotLocked => "NotLocked",
            LedgerError::InsufficientCapital { .. } => "InsufficientCapital",
            LedgerError::MalformedSnapshot(_) => "MalformedSnapshot",
            LedgerError::InvalidSector(_) => "InvalidSector",
            LedgerError::InvalidCategory(_) => "InvalidCategory",
            LedgerError::InvalidAmount(_) => "InvalidAmount",
            LedgerError::InvalidRating(_) => "InvalidRating",
            LedgerError::Unauthenticated => "Unauthenticated",
            LedgerError::InvalidCredential => "InvalidCredential",
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
