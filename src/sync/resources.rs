use super::Resource;
use crate::error::{AppError, AppResult};
use crate::session::is_well_formed_email;
use seatrack_shared::date::{MIN_CONSTRUCTION_YEAR, construction_years, current_year};
use seatrack_shared::{BoatProfile, BoatType, PersonalInfo, ResourceKind};

// =========================================================
// 个人信息 (users/{identity})
// =========================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PersonalInfoField {
    FirstName,
    LastName,
    Email,
    Phone,
    Address,
}

impl PersonalInfoField {
    pub const ALL: [PersonalInfoField; 5] = [
        PersonalInfoField::FirstName,
        PersonalInfoField::LastName,
        PersonalInfoField::Email,
        PersonalInfoField::Phone,
        PersonalInfoField::Address,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            PersonalInfoField::FirstName => "Prénom",
            PersonalInfoField::LastName => "Nom",
            PersonalInfoField::Email => "Email",
            PersonalInfoField::Phone => "Téléphone",
            PersonalInfoField::Address => "Adresse",
        }
    }
}

impl Resource for PersonalInfo {
    type Field = PersonalInfoField;

    const KIND: ResourceKind = ResourceKind::PersonalInfo;
    const SAVED_MESSAGE: &'static str = "Informations sauvegardées avec succès";

    fn set_field(&mut self, field: PersonalInfoField, value: String) {
        match field {
            PersonalInfoField::FirstName => self.first_name = value,
            PersonalInfoField::LastName => self.last_name = value,
            PersonalInfoField::Email => self.email = value,
            PersonalInfoField::Phone => self.phone = value,
            PersonalInfoField::Address => self.address = value,
        }
    }

    fn field(&self, field: PersonalInfoField) -> String {
        match field {
            PersonalInfoField::FirstName => self.first_name.clone(),
            PersonalInfoField::LastName => self.last_name.clone(),
            PersonalInfoField::Email => self.email.clone(),
            PersonalInfoField::Phone => self.phone.clone(),
            PersonalInfoField::Address => self.address.clone(),
        }
    }

    fn validate(&self) -> AppResult<()> {
        require("firstName", &self.first_name, "Le prénom est requis")?;
        require("lastName", &self.last_name, "Le nom est requis")?;
        require("email", &self.email, "L'email est requis")?;
        if !is_well_formed_email(&self.email) {
            return Err(AppError::validation("email", "Adresse email invalide"));
        }
        Ok(())
    }
}

// =========================================================
// 船只档案 (boats/{identity})
// =========================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BoatField {
    Name,
    Type,
    Length,
    Width,
    Draft,
    Manufacturer,
    Model,
    Year,
    RegistrationNumber,
    HomePort,
}

impl BoatField {
    pub const ALL: [BoatField; 10] = [
        BoatField::Name,
        BoatField::Type,
        BoatField::Length,
        BoatField::Width,
        BoatField::Draft,
        BoatField::Manufacturer,
        BoatField::Model,
        BoatField::Year,
        BoatField::RegistrationNumber,
        BoatField::HomePort,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            BoatField::Name => "Nom du bateau",
            BoatField::Type => "Type de bateau",
            BoatField::Length => "Longueur (m)",
            BoatField::Width => "Largeur (m)",
            BoatField::Draft => "Tirant d'eau (m)",
            BoatField::Manufacturer => "Constructeur",
            BoatField::Model => "Modèle",
            BoatField::Year => "Année de construction",
            BoatField::RegistrationNumber => "Numéro d'immatriculation",
            BoatField::HomePort => "Port d'attache",
        }
    }

    pub fn is_required(&self) -> bool {
        matches!(
            self,
            BoatField::Name
                | BoatField::Type
                | BoatField::Length
                | BoatField::Width
                | BoatField::Draft
                | BoatField::RegistrationNumber
        )
    }
}

impl Resource for BoatProfile {
    type Field = BoatField;

    const KIND: ResourceKind = ResourceKind::Boat;
    const SAVED_MESSAGE: &'static str = "Informations du bateau sauvegardées avec succès";

    fn set_field(&mut self, field: BoatField, value: String) {
        match field {
            BoatField::Name => self.name = value,
            // 未知标签视为未选择
            BoatField::Type => self.boat_type = BoatType::from_label(&value),
            BoatField::Length => self.length = value,
            BoatField::Width => self.width = value,
            BoatField::Draft => self.draft = value,
            BoatField::Manufacturer => self.manufacturer = value,
            BoatField::Model => self.model = value,
            BoatField::Year => self.year = value,
            BoatField::RegistrationNumber => self.registration_number = value,
            BoatField::HomePort => self.home_port = value,
        }
    }

    fn field(&self, field: BoatField) -> String {
        match field {
            BoatField::Name => self.name.clone(),
            BoatField::Type => self
                .boat_type
                .map(|t| t.label().to_string())
                .unwrap_or_default(),
            BoatField::Length => self.length.clone(),
            BoatField::Width => self.width.clone(),
            BoatField::Draft => self.draft.clone(),
            BoatField::Manufacturer => self.manufacturer.clone(),
            BoatField::Model => self.model.clone(),
            BoatField::Year => self.year.clone(),
            BoatField::RegistrationNumber => self.registration_number.clone(),
            BoatField::HomePort => self.home_port.clone(),
        }
    }

    fn validate(&self) -> AppResult<()> {
        validate_boat(self, current_year())
    }
}

/// 以给定的当前年份校验船只档案
pub fn validate_boat(boat: &BoatProfile, current: i32) -> AppResult<()> {
    require("name", &boat.name, "Le nom du bateau est requis")?;
    if boat.boat_type.is_none() {
        return Err(AppError::validation("type", "Le type de bateau est requis"));
    }
    positive_decimal("length", &boat.length, "La longueur est requise")?;
    positive_decimal("width", &boat.width, "La largeur est requise")?;
    positive_decimal("draft", &boat.draft, "Le tirant d'eau est requis")?;
    require(
        "registrationNumber",
        &boat.registration_number,
        "Le numéro d'immatriculation est requis",
    )?;

    let year = boat.year.trim();
    if !year.is_empty() {
        let in_range = year
            .parse::<i32>()
            .map(|y| construction_years(current).contains(&y))
            .unwrap_or(false);
        if !in_range {
            return Err(AppError::validation(
                "year",
                format!(
                    "L'année de construction doit être comprise entre {} et {}",
                    MIN_CONSTRUCTION_YEAR, current
                ),
            ));
        }
    }
    Ok(())
}

// =========================================================
// 校验辅助
// =========================================================

fn require(field: &'static str, value: &str, message: &str) -> AppResult<()> {
    if value.trim().is_empty() {
        return Err(AppError::validation(field, message));
    }
    Ok(())
}

/// 必填的正小数，接受逗号作为小数点
fn positive_decimal(field: &'static str, value: &str, missing: &str) -> AppResult<()> {
    require(field, value, missing)?;
    match value.trim().replace(',', ".").parse::<f64>() {
        Ok(v) if v.is_finite() && v > 0.0 => Ok(()),
        _ => Err(AppError::validation(field, "Doit être un nombre positif")),
    }
}
