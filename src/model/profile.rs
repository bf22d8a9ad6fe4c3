use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[schema(
    example = json!({
        "id": 42,
        "name": "Ahmad Firdaus",
        "email": "ahmad.firdaus@example.com",
        "employee_number": "198505242010011002",
        "position": "Staff Administrasi",
        "department": "Tata Usaha",
        "join_date": "2010-06-01",
        "phone": "081234567890"
    })
)]
pub struct UserProfile {
    #[schema(example = 42)]
    pub id: u64,

    #[schema(example = "Ahmad Firdaus")]
    pub name: String,

    #[schema(example = "ahmad.firdaus@example.com")]
    pub email: String,

    /// NIP; read-only for the owner
    #[schema(example = "198505242010011002")]
    pub employee_number: String,

    #[schema(example = "Staff Administrasi")]
    pub position: String,

    #[schema(example = "Tata Usaha")]
    pub department: String,

    #[schema(example = "2010-06-01", value_type = String, format = "date")]
    pub join_date: NaiveDate,

    #[schema(example = "081234567890", nullable = true)]
    pub phone: Option<String>,
}

/// The fields an owner may change. Everything else on the profile is read-only.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct ProfileUpdate {
    #[schema(example = "Ahmad Firdaus")]
    pub name: Option<String>,
    #[schema(example = "ahmad@example.com", format = "email")]
    pub email: Option<String>,
    #[schema(example = "+6281234567890")]
    pub phone: Option<String>,
}

impl ProfileUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.email.is_none() && self.phone.is_none()
    }

    pub fn apply(&self, profile: &mut UserProfile) {
        if let Some(name) = &self.name {
            profile.name = name.clone();
        }
        if let Some(email) = &self.email {
            profile.email = email.clone();
        }
        if let Some(phone) = &self.phone {
            profile.phone = Some(phone.clone());
        }
    }
}
