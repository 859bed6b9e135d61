use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum VariantError {
    #[error("Failed to parse variant TOML: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Invalid variant configuration: {0}")]
    Invalid(String),
}

/// The three generator flavours shipped with the tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VariantKind {
    Centres,
    Merchants,
    Agents,
}

impl VariantKind {
    pub const ALL: [VariantKind; 3] = [VariantKind::Centres, VariantKind::Merchants, VariantKind::Agents];

    pub fn as_str(self) -> &'static str {
        match self {
            VariantKind::Centres => "centres",
            VariantKind::Merchants => "merchants",
            VariantKind::Agents => "agents",
        }
    }
}

impl fmt::Display for VariantKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for VariantKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "centres" | "centers" | "centre" => Ok(VariantKind::Centres),
            "merchants" | "commercants" | "merchant" => Ok(VariantKind::Merchants),
            "agents" | "agent" => Ok(VariantKind::Agents),
            other => Err(format!("Unknown report variant: '{other}'")),
        }
    }
}

/// A field of [`crate::TransactionRow`] shown as a statement table column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RowField {
    Id,
    Date,
    Counterparty,
    Key,
    Operation,
    Commission,
    Amount,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSpec {
    pub field: RowField,
    pub header: String,
}

impl ColumnSpec {
    fn new(field: RowField, header: &str) -> Self {
        ColumnSpec { field, header: header.to_string() }
    }
}

/// Value shown on the right of a statement header line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum InfoValue {
    Key,
    Period,
    Count,
    /// Amount total followed by the currency.
    AmountSum,
    CommissionSum,
    Literal(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InfoLine {
    pub label: String,
    pub value: InfoValue,
}

impl InfoLine {
    fn new(label: &str, value: InfoValue) -> Self {
        InfoLine { label: label.to_string(), value }
    }
}

/// Everything that distinguishes one generator from another. The pipeline
/// itself is identical for all variants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportVariant {
    pub kind: VariantKind,
    pub key_column: String,
    pub id_column: String,
    pub timestamp_column: String,
    pub counterparty_column: String,
    pub amount_column: String,
    pub commission_column: Option<String>,
    pub operation_column: Option<String>,
    /// Statement file names: `<file_prefix>_<key>_<stamp>.pdf`.
    pub file_prefix: String,
    /// Archive name: `<run_label>_<stamp>.zip`.
    pub run_label: String,
    pub title: String,
    pub currency: String,
    /// `chrono` format for row dates; `\n` becomes a line break in the cell.
    pub date_format: String,
    pub amount_decimals: u32,
    pub commission_decimals: u32,
    pub total_decimals: u32,
    pub info_lines: Vec<InfoLine>,
    pub columns: Vec<ColumnSpec>,
    pub show_summary_line: bool,
}

impl ReportVariant {
    pub fn preset(kind: VariantKind) -> Self {
        match kind {
            VariantKind::Centres => Self::centres(),
            VariantKind::Merchants => Self::merchants(),
            VariantKind::Agents => Self::agents(),
        }
    }

    fn centres() -> Self {
        ReportVariant {
            kind: VariantKind::Centres,
            key_column: "CENTRE".to_string(),
            id_column: "ID".to_string(),
            timestamp_column: "DATEP".to_string(),
            counterparty_column: "CLIENT".to_string(),
            amount_column: "MONTANT".to_string(),
            commission_column: None,
            operation_column: None,
            file_prefix: "Rapport".to_string(),
            run_label: "Rapports_Multi_Centres".to_string(),
            title: "Relevé de paiement commerçant BANKILY".to_string(),
            currency: "MRU".to_string(),
            date_format: "%d/%m/%Y %H:%M".to_string(),
            amount_decimals: 1,
            commission_decimals: 1,
            total_decimals: 1,
            info_lines: vec![
                InfoLine::new("Nom du centre :", InfoValue::Key),
                InfoLine::new("Date du :", InfoValue::Period),
                InfoLine::new("No du compte :", InfoValue::Literal("2000009".to_string())),
                InfoLine::new("Total crédit :", InfoValue::AmountSum),
                InfoLine::new("Total paiement :", InfoValue::AmountSum),
            ],
            columns: vec![
                ColumnSpec::new(RowField::Id, "ID"),
                ColumnSpec::new(RowField::Date, "Date crédit compte"),
                ColumnSpec::new(RowField::Counterparty, "Client"),
                ColumnSpec::new(RowField::Key, "Centre"),
                ColumnSpec::new(RowField::Amount, "Montant de crédit"),
            ],
            show_summary_line: true,
        }
    }

    fn merchants() -> Self {
        ReportVariant {
            kind: VariantKind::Merchants,
            key_column: "COMMERCANT".to_string(),
            run_label: "Rapports_Multi_Commercants".to_string(),
            info_lines: vec![
                InfoLine::new("Nom du commerçant :", InfoValue::Key),
                InfoLine::new("Date du :", InfoValue::Period),
                InfoLine::new("Total transactions :", InfoValue::Count),
                InfoLine::new("Total paiement :", InfoValue::AmountSum),
            ],
            columns: vec![
                ColumnSpec::new(RowField::Id, "ID"),
                ColumnSpec::new(RowField::Date, "Date crédit compte"),
                ColumnSpec::new(RowField::Counterparty, "Client"),
                ColumnSpec::new(RowField::Key, "Commerçant"),
                ColumnSpec::new(RowField::Amount, "Montant de crédit"),
            ],
            ..Self::centres()
        }
    }

    fn agents() -> Self {
        ReportVariant {
            kind: VariantKind::Agents,
            key_column: "CODE_AGENT".to_string(),
            id_column: "ID_TRS".to_string(),
            timestamp_column: "DATE_TRS".to_string(),
            counterparty_column: "CLIENT".to_string(),
            amount_column: "MONTANT".to_string(),
            commission_column: Some("COMMISSION".to_string()),
            operation_column: Some("TYPE_OPERATION".to_string()),
            file_prefix: "Releve_Agent".to_string(),
            run_label: "Rapports_Multi_Agents".to_string(),
            title: "Relevé Agent BANKILY".to_string(),
            currency: "MRU".to_string(),
            date_format: "%d/%m/%Y\n%H:%M:%S".to_string(),
            amount_decimals: 0,
            commission_decimals: 1,
            total_decimals: 1,
            info_lines: vec![
                InfoLine::new("Date du :", InfoValue::Period),
                InfoLine::new("Code Agent :", InfoValue::Key),
                InfoLine::new("Total transaction :", InfoValue::Count),
                InfoLine::new("Total commission :", InfoValue::CommissionSum),
            ],
            columns: vec![
                ColumnSpec::new(RowField::Date, "Date trs"),
                ColumnSpec::new(RowField::Id, "ID trs"),
                ColumnSpec::new(RowField::Operation, "Type opération"),
                ColumnSpec::new(RowField::Counterparty, "Client"),
                ColumnSpec::new(RowField::Commission, "Commission"),
                ColumnSpec::new(RowField::Amount, "Montant"),
            ],
            show_summary_line: false,
        }
    }

    /// Applies the fields present in `toml_content` on top of `base`.
    pub fn from_toml(base: ReportVariant, toml_content: &str) -> Result<Self, VariantError> {
        let overrides: VariantOverride = toml::from_str(toml_content)?;
        let variant = overrides.apply(base);
        variant.validate()?;
        Ok(variant)
    }

    pub fn validate(&self) -> Result<(), VariantError> {
        if self.key_column.trim().is_empty() {
            return Err(VariantError::Invalid("key_column is empty".to_string()));
        }
        if self.columns.is_empty() {
            return Err(VariantError::Invalid("no table columns".to_string()));
        }
        let wants_commission = self.columns.iter().any(|c| c.field == RowField::Commission)
            || self.info_lines.iter().any(|l| l.value == InfoValue::CommissionSum);
        if wants_commission && self.commission_column.is_none() {
            return Err(VariantError::Invalid(
                "commission shown but no commission_column configured".to_string(),
            ));
        }
        Ok(())
    }

    /// Columns without which the run must not start.
    pub fn mandatory_columns(&self) -> Vec<&str> {
        let mut cols = vec![self.key_column.as_str()];
        if let Some(c) = &self.commission_column {
            cols.push(c.as_str());
        }
        cols
    }

    /// Every column the variant reads.
    pub fn declared_columns(&self) -> Vec<&str> {
        let mut cols = vec![
            self.id_column.as_str(),
            self.timestamp_column.as_str(),
            self.counterparty_column.as_str(),
            self.amount_column.as_str(),
            self.key_column.as_str(),
        ];
        cols.extend(self.commission_column.as_deref());
        cols.extend(self.operation_column.as_deref());
        cols
    }

    /// Identifier-like columns that must never be read as numbers.
    pub fn text_columns(&self) -> Vec<&str> {
        let mut cols = vec![
            self.id_column.as_str(),
            self.key_column.as_str(),
            self.counterparty_column.as_str(),
        ];
        cols.extend(self.operation_column.as_deref());
        cols
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct VariantOverride {
    key_column: Option<String>,
    id_column: Option<String>,
    timestamp_column: Option<String>,
    counterparty_column: Option<String>,
    amount_column: Option<String>,
    commission_column: Option<String>,
    operation_column: Option<String>,
    file_prefix: Option<String>,
    run_label: Option<String>,
    title: Option<String>,
    currency: Option<String>,
    date_format: Option<String>,
    amount_decimals: Option<u32>,
    commission_decimals: Option<u32>,
    total_decimals: Option<u32>,
    info_lines: Option<Vec<InfoLine>>,
    columns: Option<Vec<ColumnSpec>>,
    show_summary_line: Option<bool>,
}

impl VariantOverride {
    fn apply(self, mut v: ReportVariant) -> ReportVariant {
        macro_rules! set {
            ($($field:ident),*) => {
                $(if let Some(value) = self.$field { v.$field = value; })*
            };
        }
        set!(
            key_column,
            id_column,
            timestamp_column,
            counterparty_column,
            amount_column,
            file_prefix,
            run_label,
            title,
            currency,
            date_format,
            amount_decimals,
            commission_decimals,
            total_decimals,
            info_lines,
            columns,
            show_summary_line
        );
        if self.commission_column.is_some() {
            v.commission_column = self.commission_column;
        }
        if self.operation_column.is_some() {
            v.operation_column = self.operation_column;
        }
        v
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets_use_expected_key_columns() {
        assert_eq!(ReportVariant::preset(VariantKind::Centres).key_column, "CENTRE");
        assert_eq!(ReportVariant::preset(VariantKind::Merchants).key_column, "COMMERCANT");
        assert_eq!(ReportVariant::preset(VariantKind::Agents).key_column, "CODE_AGENT");
    }

    #[test]
    fn presets_validate() {
        for kind in VariantKind::ALL {
            ReportVariant::preset(kind).validate().unwrap();
        }
    }

    #[test]
    fn agents_require_commission_column() {
        let agents = ReportVariant::preset(VariantKind::Agents);
        assert_eq!(agents.mandatory_columns(), vec!["CODE_AGENT", "COMMISSION"]);
        let centres = ReportVariant::preset(VariantKind::Centres);
        assert_eq!(centres.mandatory_columns(), vec!["CENTRE"]);
    }

    #[test]
    fn text_columns_cover_identifiers() {
        let agents = ReportVariant::preset(VariantKind::Agents);
        let cols = agents.text_columns();
        assert!(cols.contains(&"ID_TRS"));
        assert!(cols.contains(&"CODE_AGENT"));
        assert!(cols.contains(&"CLIENT"));
        assert!(!cols.contains(&"MONTANT"));
    }

    #[test]
    fn kind_from_str_accepts_aliases() {
        assert_eq!("Centers".parse::<VariantKind>().unwrap(), VariantKind::Centres);
        assert_eq!("commercants".parse::<VariantKind>().unwrap(), VariantKind::Merchants);
        assert_eq!("agent".parse::<VariantKind>().unwrap(), VariantKind::Agents);
        assert!("banks".parse::<VariantKind>().is_err());
    }

    #[test]
    fn from_toml_overrides_only_given_fields() {
        let base = ReportVariant::preset(VariantKind::Centres);
        let toml = r#"
            key_column = "AGENCE"
            file_prefix = "Releve_Agence"

            [[info_lines]]
            label = "Agence :"
            value = { kind = "key" }

            [[info_lines]]
            label = "Compte :"
            value = { kind = "literal", value = "3000001" }
        "#;
        let v = ReportVariant::from_toml(base.clone(), toml).unwrap();
        assert_eq!(v.key_column, "AGENCE");
        assert_eq!(v.file_prefix, "Releve_Agence");
        assert_eq!(v.info_lines.len(), 2);
        assert_eq!(v.info_lines[1].value, InfoValue::Literal("3000001".to_string()));
        assert_eq!(v.run_label, base.run_label);
        assert_eq!(v.columns, base.columns);
    }

    #[test]
    fn from_toml_rejects_unknown_fields() {
        let base = ReportVariant::preset(VariantKind::Centres);
        assert!(matches!(
            ReportVariant::from_toml(base, "colour = \"blue\""),
            Err(VariantError::Toml(_))
        ));
    }

    #[test]
    fn from_toml_rejects_commission_without_column() {
        let base = ReportVariant::preset(VariantKind::Centres);
        let toml = r#"
            [[columns]]
            field = "commission"
            header = "Commission"
        "#;
        assert!(matches!(
            ReportVariant::from_toml(base, toml),
            Err(VariantError::Invalid(_))
        ));
    }
}
