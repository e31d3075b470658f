//! Coercion from raw form values into the request body sent to the
//! prediction service.

use serde::{Deserialize, Serialize};

use crate::domain::{FormField, FormState, FormValue};

/// Request body for `POST /api/predict`. Numeric fields are always finite.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestPayload {
    #[serde(rename = "Gender")]
    pub gender: String,
    #[serde(rename = "Married")]
    pub married: String,
    #[serde(rename = "Dependents")]
    pub dependents: String,
    #[serde(rename = "Education")]
    pub education: String,
    #[serde(rename = "Self_Employed")]
    pub self_employed: String,
    #[serde(rename = "ApplicantIncome")]
    pub applicant_income: f64,
    #[serde(rename = "CoapplicantIncome")]
    pub coapplicant_income: f64,
    #[serde(rename = "LoanAmount")]
    pub loan_amount: f64,
    #[serde(rename = "Loan_Amount_Term")]
    pub loan_amount_term: f64,
    #[serde(rename = "Credit_History")]
    pub credit_history: f64,
    #[serde(rename = "Property_Area")]
    pub property_area: String,
}

pub fn build(form: &FormState) -> RequestPayload {
    RequestPayload {
        gender: form.gender.clone(),
        married: form.married.clone(),
        dependents: form.dependents.clone(),
        education: form.education.clone(),
        self_employed: form.self_employed.clone(),
        applicant_income: coerce(FormField::ApplicantIncome, &form.applicant_income),
        coapplicant_income: coerce(FormField::CoapplicantIncome, &form.coapplicant_income),
        loan_amount: coerce(FormField::LoanAmount, &form.loan_amount),
        loan_amount_term: coerce(FormField::LoanAmountTerm, &form.loan_amount_term),
        credit_history: coerce(FormField::CreditHistory, &form.credit_history),
        property_area: form.property_area.clone(),
    }
}

/// Parses a numeric field, falling back to the field default when the
/// value is empty, unparsable, or not finite.
pub fn coerce(field: FormField, value: &FormValue) -> f64 {
    let default = field.numeric_default().unwrap_or(0.0);
    let parsed = match value {
        FormValue::Number(n) => Some(*n),
        FormValue::Text(raw) => raw.trim().parse::<f64>().ok(),
    };
    parsed.filter(|n| n.is_finite()).unwrap_or(default)
}

impl From<&RequestPayload> for FormState {
    fn from(payload: &RequestPayload) -> Self {
        Self {
            gender: payload.gender.clone(),
            married: payload.married.clone(),
            dependents: payload.dependents.clone(),
            education: payload.education.clone(),
            self_employed: payload.self_employed.clone(),
            applicant_income: FormValue::Number(payload.applicant_income),
            coapplicant_income: FormValue::Number(payload.coapplicant_income),
            loan_amount: FormValue::Number(payload.loan_amount),
            loan_amount_term: FormValue::Number(payload.loan_amount_term),
            credit_history: FormValue::Number(payload.credit_history),
            property_area: payload.property_area.clone(),
        }
    }
}
