use diesel::prelude::*;
use uuid::Uuid;

use crate::{
    domain::value_objects::plans::{PlanLimits, PlanTier},
    infra::db::postgres::schema::plans,
};

#[derive(Debug, Clone)]
pub struct PlanEntity {
    pub id: Uuid,
    pub code: String,
    pub name: Option<String>,
    pub tier: PlanTier,
    pub limits: PlanLimits,
    pub is_active: bool,
}

/// Raw row used for Diesel queries. Limits stay as JSON and are resolved into PlanLimits.
#[derive(Debug, Clone, Identifiable, Selectable, Queryable)]
#[diesel(table_name = plans)]
pub struct PlanRow {
    pub id: Uuid,
    pub code: String,
    pub name: Option<String>,
    pub limits: Option<serde_json::Value>,
    pub is_active: bool,
}

impl From<PlanRow> for PlanEntity {
    fn from(value: PlanRow) -> Self {
        let tier = PlanTier::from_code(&value.code);
        let limits = PlanLimits::for_tier(tier, value.limits.as_ref());

        Self {
            id: value.id,
            code: value.code,
            name: value.name,
            tier,
            limits,
            is_active: value.is_active,
        }
    }
}
