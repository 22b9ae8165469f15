use chrono::NaiveDate;
use lazy_static::lazy_static;
use regex::Regex;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::clients::ImageUpload;
use crate::errors::Error;
use crate::models::BuyingType;

/// Email TLDs registration is closed for.
pub const BLOCKED_EMAIL_DOMAINS: &[&str] = &["com", "net"];

lazy_static! {
    static ref PHONE_RE: Regex = Regex::new(r"^\+?[0-9][0-9 ()\-]{2,18}[0-9]$").unwrap();
    static ref SLUG_RE: Regex = Regex::new(r"^[-a-zA-Z0-9_]+$").unwrap();
}

#[derive(Clone, Debug, Deserialize, Serialize, Validate)]
pub struct OrderForm {
    #[validate(length(min = 1))]
    pub first_name: String,
    #[validate(length(min = 1))]
    pub last_name: String,
    #[validate(length(min = 1))]
    pub phone: String,
    pub address: Option<String>,
    pub buying_type: String,
    pub order_date: String,
    pub comment: Option<String>,
}

impl OrderForm {
    pub fn check(&self) -> Result<(), Error> {
        self.validate()?;
        if !PHONE_RE.is_match(&self.phone) {
            return Err(Error::Validation("phone number is malformed".into()));
        }
        self.buying_type()?;
        self.order_date()?;
        Ok(())
    }

    pub fn buying_type(&self) -> Result<BuyingType, Error> {
        self.buying_type
            .parse::<BuyingType>()
            .map_err(|_| Error::Validation(format!("unknown buying type \"{}\"", self.buying_type)))
    }

    pub fn order_date(&self) -> Result<NaiveDate, Error> {
        NaiveDate::parse_from_str(&self.order_date, "%Y-%m-%d")
            .map_err(|_| Error::Validation(format!("bad order date \"{}\"", self.order_date)))
    }
}

#[derive(Clone, Debug, Deserialize, Serialize, Validate)]
pub struct LoginForm {
    #[validate(length(min = 1))]
    pub username: String,
    #[validate(length(min = 1))]
    pub password: String,
}

impl LoginForm {
    pub fn check(&self) -> Result<(), Error> {
        self.validate()?;
        Ok(())
    }
}

#[derive(Clone, Debug, Deserialize, Serialize, Validate)]
pub struct RegistrationForm {
    #[validate(length(min = 1))]
    pub username: String,
    #[validate(length(min = 1))]
    pub password: String,
    pub confirm_password: String,
    #[validate(length(min = 1))]
    pub first_name: String,
    #[validate(length(min = 1))]
    pub last_name: String,
    pub address: Option<String>,
    pub phone: Option<String>,
    #[validate(email)]
    pub email: String,
}

impl RegistrationForm {
    pub fn check(&self) -> Result<(), Error> {
        self.validate()?;
        if self.password != self.confirm_password {
            return Err(Error::Validation("passwords do not match".into()));
        }
        let domain = self.email.rsplit('.').next().unwrap_or_default();
        if BLOCKED_EMAIL_DOMAINS.contains(&domain) {
            return Err(Error::Validation(format!(
                "registration for domain \"{}\" is not available",
                domain
            )));
        }
        if let Some(phone) = self.phone.as_deref() {
            if !PHONE_RE.is_match(phone) {
                return Err(Error::Validation("phone number is malformed".into()));
            }
        }
        Ok(())
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct ChangeQtyForm {
    pub qty: i32,
}

#[derive(Clone, Debug, Deserialize, Serialize, Validate)]
pub struct PizzaAddForm {
    pub category_id: i32,
    #[validate(length(min = 1, max = 255))]
    pub title: String,
    #[validate(length(min = 1))]
    pub slug: String,
    pub image: ImageUpload,
    pub description: String,
    pub price: Decimal,
    #[validate(length(min = 1, max = 255))]
    pub size: String,
    #[validate(length(min = 1, max = 255))]
    pub board: String,
    #[validate(length(min = 1, max = 255))]
    pub dough: String,
    pub vegetarian: bool,
}

impl PizzaAddForm {
    pub fn check(&self) -> Result<(), Error> {
        self.validate()?;
        check_slug(&self.slug)
    }
}

#[derive(Clone, Debug, Deserialize, Serialize, Validate)]
pub struct BeerAddForm {
    pub category_id: i32,
    #[validate(length(min = 1, max = 255))]
    pub title: String,
    #[validate(length(min = 1))]
    pub slug: String,
    pub image: ImageUpload,
    pub description: String,
    pub price: Decimal,
    #[validate(length(min = 1, max = 255))]
    pub colour: String,
    #[validate(length(min = 1, max = 255))]
    pub alcohol_strength: String,
    #[validate(length(min = 1, max = 255))]
    pub filtered: String,
    #[validate(length(min = 1, max = 255))]
    pub grade: String,
}

impl BeerAddForm {
    pub fn check(&self) -> Result<(), Error> {
        self.validate()?;
        check_slug(&self.slug)
    }
}

fn check_slug(slug: &str) -> Result<(), Error> {
    if SLUG_RE.is_match(slug) {
        Ok(())
    } else {
        Err(Error::Validation(format!("\"{}\" is not a valid slug", slug)))
    }
}
