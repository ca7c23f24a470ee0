// src/validation.rs
//! Client-side form validation, run before any request is built

use chrono::{Datelike, NaiveDate};

use crate::api::auth::RegisterRequest;
use crate::error::ValidationErrors;
use crate::types::payment::CardDetails;
use crate::types::rating::{MAX_SCORE, MIN_SCORE};
use crate::types::user::{CandidateProfile, EstablishmentProfile, UserType};

pub const MIN_PASSWORD_LENGTH: usize = 6;
pub const MAX_COVER_LETTER_LENGTH: usize = 5000;

pub fn is_valid_email(email: &str) -> bool {
    let email = email.trim();
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && !email.chars().any(char::is_whitespace)
        && domain.split('.').count() >= 2
        && domain.split('.').all(|part| !part.is_empty())
}

fn check_email(errors: &mut ValidationErrors, email: &str) {
    if email.trim().is_empty() {
        errors.add("email", "L'email est requis");
    } else if !is_valid_email(email) {
        errors.add("email", "Format d'email invalide");
    }
}

fn check_new_password(errors: &mut ValidationErrors, field: &str, password: &str, confirm: &str) {
    if password.is_empty() {
        errors.add(field, "Le mot de passe est requis");
    } else if password.chars().count() < MIN_PASSWORD_LENGTH {
        errors.add(
            field,
            format!(
                "Le mot de passe doit contenir au moins {} caractères",
                MIN_PASSWORD_LENGTH
            ),
        );
    }
    if password != confirm {
        errors.add("confirmPassword", "Les mots de passe ne correspondent pas");
    }
}

pub fn validate_login(email: &str, password: &str) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();
    check_email(&mut errors, email);
    if password.is_empty() {
        errors.add("password", "Le mot de passe est requis");
    }
    errors.into_result()
}

/// Registration form as typed by the user.
#[derive(Debug, Clone, Default)]
pub struct RegisterForm {
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub user_type: Option<UserType>,
    pub first_name: String,
    pub last_name: String,
    pub establishment_name: String,
}

impl RegisterForm {
    /// Validate every field and build the request on success.
    pub fn validate(&self) -> Result<RegisterRequest, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        check_email(&mut errors, &self.email);
        check_new_password(&mut errors, "password", &self.password, &self.confirm_password);

        match self.user_type {
            None => errors.add("userType", "Choisissez un type de compte"),
            Some(UserType::Candidate) => {
                if self.first_name.trim().is_empty() {
                    errors.add("firstName", "Le prénom est requis");
                }
                if self.last_name.trim().is_empty() {
                    errors.add("lastName", "Le nom est requis");
                }
            }
            Some(UserType::Establishment) => {
                if self.establishment_name.trim().is_empty() {
                    errors.add("establishmentName", "Le nom de l'établissement est requis");
                }
            }
        }
        errors.into_result()?;

        // user_type is Some once validation passed
        let user_type = self.user_type.unwrap_or(UserType::Candidate);
        let (candidate_profile, establishment_profile) = match user_type {
            UserType::Candidate => (
                Some(CandidateProfile {
                    first_name: self.first_name.trim().to_string(),
                    last_name: self.last_name.trim().to_string(),
                    ..Default::default()
                }),
                None,
            ),
            UserType::Establishment => (
                None,
                Some(EstablishmentProfile {
                    name: self.establishment_name.trim().to_string(),
                    ..Default::default()
                }),
            ),
        };

        Ok(RegisterRequest {
            email: self.email.trim().to_string(),
            password: self.password.clone(),
            user_type,
            candidate_profile,
            establishment_profile,
        })
    }
}

pub fn validate_password_change(
    old_password: &str,
    new_password: &str,
    confirm: &str,
) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();
    if old_password.is_empty() {
        errors.add("currentPassword", "Le mot de passe actuel est requis");
    }
    check_new_password(&mut errors, "newPassword", new_password, confirm);
    if !old_password.is_empty() && old_password == new_password {
        errors.add("newPassword", "Le nouveau mot de passe doit être différent");
    }
    errors.into_result()
}

pub fn validate_password_reset(new_password: &str, confirm: &str) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();
    check_new_password(&mut errors, "password", new_password, confirm);
    errors.into_result()
}

pub fn validate_cover_letter(cover_letter: &str) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();
    if cover_letter.chars().count() > MAX_COVER_LETTER_LENGTH {
        errors.add(
            "coverLetter",
            format!("La lettre ne doit pas dépasser {} caractères", MAX_COVER_LETTER_LENGTH),
        );
    }
    errors.into_result()
}

pub fn validate_rating(score: u8, comment: &str) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();
    if !(MIN_SCORE..=MAX_SCORE).contains(&score) {
        errors.add(
            "score",
            format!("La note doit être comprise entre {} et {}", MIN_SCORE, MAX_SCORE),
        );
    }
    if comment.trim().is_empty() {
        errors.add("comment", "Un commentaire est requis");
    }
    errors.into_result()
}

/// Format-only card check used by the simulated checkout.
pub fn validate_card(card: &CardDetails, today: NaiveDate) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();

    if card.holder.trim().is_empty() {
        errors.add("holder", "Le titulaire de la carte est requis");
    }

    let digits = card.digits();
    if !(13..=19).contains(&digits.len()) || !digits.chars().all(|c| c.is_ascii_digit()) {
        errors.add("number", "Numéro de carte invalide");
    }

    match parse_expiry(&card.expiry) {
        None => errors.add("expiry", "Date d'expiration invalide (MM/AA)"),
        Some((year, month)) => {
            if (year, month) < (today.year(), today.month()) {
                errors.add("expiry", "Carte expirée");
            }
        }
    }

    let cvc = card.cvc.trim();
    if !(3..=4).contains(&cvc.len()) || !cvc.chars().all(|c| c.is_ascii_digit()) {
        errors.add("cvc", "CVC invalide");
    }

    errors.into_result()
}

/// `MM/YY` to (full year, month).
fn parse_expiry(expiry: &str) -> Option<(i32, u32)> {
    let (month, year) = expiry.trim().split_once('/')?;
    let month: u32 = month.trim().parse().ok()?;
    let year: i32 = year.trim().parse().ok()?;
    if !(1..=12).contains(&month) || !(0..100).contains(&year) {
        return None;
    }
    Some((2000 + year, month))
}
