use std::{fmt, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// The fields of the loan application form, named as the prediction
/// service expects them on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormField {
    Gender,
    Married,
    Dependents,
    Education,
    SelfEmployed,
    ApplicantIncome,
    CoapplicantIncome,
    LoanAmount,
    LoanAmountTerm,
    CreditHistory,
    PropertyArea,
}

impl FormField {
    pub const ALL: [FormField; 11] = [
        FormField::Gender,
        FormField::Married,
        FormField::Dependents,
        FormField::Education,
        FormField::SelfEmployed,
        FormField::ApplicantIncome,
        FormField::CoapplicantIncome,
        FormField::LoanAmount,
        FormField::LoanAmountTerm,
        FormField::CreditHistory,
        FormField::PropertyArea,
    ];

    pub fn name(self) -> &'static str {
        match self {
            FormField::Gender => "Gender",
            FormField::Married => "Married",
            FormField::Dependents => "Dependents",
            FormField::Education => "Education",
            FormField::SelfEmployed => "Self_Employed",
            FormField::ApplicantIncome => "ApplicantIncome",
            FormField::CoapplicantIncome => "CoapplicantIncome",
            FormField::LoanAmount => "LoanAmount",
            FormField::LoanAmountTerm => "Loan_Amount_Term",
            FormField::CreditHistory => "Credit_History",
            FormField::PropertyArea => "Property_Area",
        }
    }

    pub fn is_numeric(self) -> bool {
        self.numeric_default().is_some()
    }

    /// Value substituted when a numeric field is empty or does not coerce.
    pub fn numeric_default(self) -> Option<f64> {
        match self {
            FormField::ApplicantIncome | FormField::CoapplicantIncome | FormField::LoanAmount => {
                Some(0.0)
            }
            FormField::LoanAmountTerm => Some(360.0),
            FormField::CreditHistory => Some(1.0),
            _ => None,
        }
    }
}

impl fmt::Display for FormField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown form field '{0}'")]
pub struct UnknownField(pub String);

impl FromStr for FormField {
    type Err = UnknownField;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FormField::ALL
            .into_iter()
            .find(|field| field.name() == s)
            .ok_or_else(|| UnknownField(s.to_string()))
    }
}

/// A raw value as entered into the form. Nothing is validated here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FormValue {
    Number(f64),
    Text(String),
}

impl FormValue {
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    pub fn empty() -> Self {
        Self::Text(String::new())
    }
}

impl Default for FormValue {
    fn default() -> Self {
        Self::empty()
    }
}

impl From<&str> for FormValue {
    fn from(value: &str) -> Self {
        Self::text(value)
    }
}

impl From<String> for FormValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<f64> for FormValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

/// Form contents owned by the input-handling side. Mutated only through
/// user edits; the orchestrator never writes to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FormState {
    #[serde(rename = "Gender", deserialize_with = "categorical_text")]
    pub gender: String,
    #[serde(rename = "Married", deserialize_with = "categorical_text")]
    pub married: String,
    #[serde(rename = "Dependents", deserialize_with = "categorical_text")]
    pub dependents: String,
    #[serde(rename = "Education", deserialize_with = "categorical_text")]
    pub education: String,
    #[serde(rename = "Self_Employed", deserialize_with = "categorical_text")]
    pub self_employed: String,
    #[serde(rename = "ApplicantIncome")]
    pub applicant_income: FormValue,
    #[serde(rename = "CoapplicantIncome")]
    pub coapplicant_income: FormValue,
    #[serde(rename = "LoanAmount")]
    pub loan_amount: FormValue,
    #[serde(rename = "Loan_Amount_Term")]
    pub loan_amount_term: FormValue,
    #[serde(rename = "Credit_History")]
    pub credit_history: FormValue,
    #[serde(rename = "Property_Area", deserialize_with = "categorical_text")]
    pub property_area: String,
}

/// Categorical values may arrive as JSON numbers (`"Dependents": 0`);
/// store them as their text.
fn categorical_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(match FormValue::deserialize(deserializer)? {
        FormValue::Number(n) => n.to_string(),
        FormValue::Text(s) => s,
    })
}

impl Default for FormState {
    fn default() -> Self {
        Self {
            gender: "Male".into(),
            married: "Yes".into(),
            dependents: "0".into(),
            education: "Graduate".into(),
            self_employed: "No".into(),
            applicant_income: FormValue::empty(),
            coapplicant_income: FormValue::empty(),
            loan_amount: FormValue::empty(),
            loan_amount_term: FormValue::Number(360.0),
            credit_history: FormValue::Number(1.0),
            property_area: "Urban".into(),
        }
    }
}

impl FormState {
    /// Applies one raw edit, stored verbatim.
    pub fn set(&mut self, field: FormField, raw: impl Into<String>) {
        let raw = raw.into();
        match field {
            FormField::Gender => self.gender = raw,
            FormField::Married => self.married = raw,
            FormField::Dependents => self.dependents = raw,
            FormField::Education => self.education = raw,
            FormField::SelfEmployed => self.self_employed = raw,
            FormField::PropertyArea => self.property_area = raw,
            FormField::ApplicantIncome => self.applicant_income = FormValue::Text(raw),
            FormField::CoapplicantIncome => self.coapplicant_income = FormValue::Text(raw),
            FormField::LoanAmount => self.loan_amount = FormValue::Text(raw),
            FormField::LoanAmountTerm => self.loan_amount_term = FormValue::Text(raw),
            FormField::CreditHistory => self.credit_history = FormValue::Text(raw),
        }
    }

    pub fn get(&self, field: FormField) -> FormValue {
        match field {
            FormField::Gender => FormValue::text(&self.gender),
            FormField::Married => FormValue::text(&self.married),
            FormField::Dependents => FormValue::text(&self.dependents),
            FormField::Education => FormValue::text(&self.education),
            FormField::SelfEmployed => FormValue::text(&self.self_employed),
            FormField::PropertyArea => FormValue::text(&self.property_area),
            FormField::ApplicantIncome => self.applicant_income.clone(),
            FormField::CoapplicantIncome => self.coapplicant_income.clone(),
            FormField::LoanAmount => self.loan_amount.clone(),
            FormField::LoanAmountTerm => self.loan_amount_term.clone(),
            FormField::CreditHistory => self.credit_history.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelSelection {
    Logistic,
    Tree,
}

impl ModelSelection {
    /// Key of the response object carrying this model's result.
    pub fn response_field(self) -> &'static str {
        match self {
            ModelSelection::Logistic => crate::protocol::LOGISTIC_REGRESSION_FIELD,
            ModelSelection::Tree => crate::protocol::DECISION_TREE_FIELD,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ModelSelection::Logistic => "Logistic Regression",
            ModelSelection::Tree => "Decision Tree",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ModelSelection::Logistic => "logistic",
            ModelSelection::Tree => "tree",
        }
    }
}

impl fmt::Display for ModelSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown model '{0}', expected 'logistic' or 'tree'")]
pub struct UnknownModel(pub String);

impl FromStr for ModelSelection {
    type Err = UnknownModel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "logistic" => Ok(ModelSelection::Logistic),
            "tree" => Ok(ModelSelection::Tree),
            _ => Err(UnknownModel(s.to_string())),
        }
    }
}

/// Visible lifecycle of prediction requests. Written only by the
/// orchestrator; renderers read snapshots.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RequestState {
    #[default]
    Idle,
    Loading {
        selection: ModelSelection,
    },
    Succeeded {
        selection: ModelSelection,
        result: String,
    },
    Failed {
        selection: ModelSelection,
        message: String,
    },
}

impl RequestState {
    pub fn selection(&self) -> Option<ModelSelection> {
        match self {
            RequestState::Idle => None,
            RequestState::Loading { selection }
            | RequestState::Succeeded { selection, .. }
            | RequestState::Failed { selection, .. } => Some(*selection),
        }
    }

    pub fn is_settled(&self) -> bool {
        matches!(
            self,
            RequestState::Succeeded { .. } | RequestState::Failed { .. }
        )
    }
}
