//! Column schema of P-pop planet population tables
//!
//! Column order varies between P-pop versions, so positions are resolved
//! once from the header row into a fixed-size lookup.

use thiserror::Error;

/// Errors raised while resolving the table schema
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("Table has {lines} lines, header row {header_row} is missing")]
    MissingHeader { header_row: usize, lines: usize },

    #[error("Header is missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<&'static str>),
}

/// Every column the reader needs, in a fixed order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    Nuniverse,
    Rp,
    Porb,
    Mp,
    Ep,
    Ip,
    OmegaNode,
    OmegaPeri,
    Thetap,
    Abond,
    AgeomVis,
    AgeomMir,
    Z,
    Ap,
    SmallRp,
    AngSep,
    MaxAngSep,
    Fp,
    SmallFp,
    Tp,
    Nstar,
    Rs,
    Ms,
    Ts,
    Ds,
    Stype,
    Ra,
    Dec,
}

impl Column {
    pub const COUNT: usize = 28;

    pub const ALL: [Column; Column::COUNT] = [
        Column::Nuniverse,
        Column::Rp,
        Column::Porb,
        Column::Mp,
        Column::Ep,
        Column::Ip,
        Column::OmegaNode,
        Column::OmegaPeri,
        Column::Thetap,
        Column::Abond,
        Column::AgeomVis,
        Column::AgeomMir,
        Column::Z,
        Column::Ap,
        Column::SmallRp,
        Column::AngSep,
        Column::MaxAngSep,
        Column::Fp,
        Column::SmallFp,
        Column::Tp,
        Column::Nstar,
        Column::Rs,
        Column::Ms,
        Column::Ts,
        Column::Ds,
        Column::Stype,
        Column::Ra,
        Column::Dec,
    ];

    /// Star-level columns, identical on every row of one system
    pub const STAR_LEVEL: [Column; 7] = [
        Column::Rs,
        Column::Ms,
        Column::Ts,
        Column::Ds,
        Column::Stype,
        Column::Ra,
        Column::Dec,
    ];

    /// Column name as it appears in the header row
    pub fn name(self) -> &'static str {
        match self {
            Column::Nuniverse => "Nuniverse",
            Column::Rp => "Rp",
            Column::Porb => "Porb",
            Column::Mp => "Mp",
            Column::Ep => "ep",
            Column::Ip => "ip",
            Column::OmegaNode => "Omegap",
            Column::OmegaPeri => "omegap",
            Column::Thetap => "thetap",
            Column::Abond => "Abond",
            Column::AgeomVis => "AgeomVIS",
            Column::AgeomMir => "AgeomMIR",
            Column::Z => "z",
            Column::Ap => "ap",
            Column::SmallRp => "rp",
            Column::AngSep => "AngSep",
            Column::MaxAngSep => "maxAngSep",
            Column::Fp => "Fp",
            Column::SmallFp => "fp",
            Column::Tp => "Tp",
            Column::Nstar => "Nstar",
            Column::Rs => "Rs",
            Column::Ms => "Ms",
            Column::Ts => "Ts",
            Column::Ds => "Ds",
            Column::Stype => "Stype",
            Column::Ra => "RA",
            Column::Dec => "Dec",
        }
    }

    fn slot(self) -> usize {
        self as usize
    }
}

/// Resolved positions of every required column
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    indices: [usize; Column::COUNT],
    width: usize,
}

impl Schema {
    /// Resolve column positions from a tab-separated header line
    ///
    /// Header tokens are matched exactly after trimming whitespace. When a
    /// name appears more than once the first occurrence wins.
    ///
    /// # Errors
    ///
    /// `SchemaError::MissingColumns` listing every required name that is absent.
    pub fn resolve(header: &str) -> Result<Self, SchemaError> {
        let tokens: Vec<&str> = header.split('\t').map(str::trim).collect();

        let mut indices = [0usize; Column::COUNT];
        let mut missing = Vec::new();

        for column in Column::ALL {
            match tokens.iter().position(|token| *token == column.name()) {
                Some(index) => indices[column.slot()] = index,
                None => missing.push(column.name()),
            }
        }

        if !missing.is_empty() {
            return Err(SchemaError::MissingColumns(missing));
        }

        let width = indices.iter().max().map_or(0, |max| max + 1);
        Ok(Self { indices, width })
    }

    /// Position of a column in each row
    pub fn index(&self, column: Column) -> usize {
        self.indices[column.slot()]
    }

    /// Minimum number of fields a data row must have
    pub fn min_fields(&self) -> usize {
        self.width
    }
}
