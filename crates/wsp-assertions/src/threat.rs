//! SQL injection screening. Introduced in policy version 5.0.

use std::collections::BTreeSet;
use std::sync::Arc;

use wsp_core::mapping::{BeanTypeMapping, EnumSetTypeMapping};
use wsp_core::model::property::{enum_set_to_value, enum_set_value};
use wsp_core::{Property, TypeMapping, Version, WireEnum};

use crate::types::{SQL_ATTACK, SQL_PROTECTION_SET};

/// Attack pattern family to scan for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SqlProtection {
    MsSql,
    Oracle,
    MetaText,
    Meta,
}

impl WireEnum for SqlProtection {
    fn all() -> &'static [Self] {
        &[
            SqlProtection::MsSql,
            SqlProtection::Oracle,
            SqlProtection::MetaText,
            SqlProtection::Meta,
        ]
    }

    fn wire_name(self) -> &'static str {
        match self {
            SqlProtection::MsSql => "SqlMsSql",
            SqlProtection::Oracle => "SqlOracle",
            SqlProtection::MetaText => "SqlMetaText",
            SqlProtection::Meta => "SqlMeta",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SqlAttackAssertion {
    pub enabled: bool,
    pub protections: BTreeSet<SqlProtection>,
}

impl Default for SqlAttackAssertion {
    fn default() -> Self {
        Self {
            enabled: true,
            protections: BTreeSet::new(),
        }
    }
}

impl SqlAttackAssertion {
    pub fn protecting(protections: impl IntoIterator<Item = SqlProtection>) -> Self {
        Self {
            protections: protections.into_iter().collect(),
            ..Self::default()
        }
    }
}

wsp_core::impl_assertion!(SqlAttackAssertion, &SQL_ATTACK);

pub(crate) fn mappings() -> Vec<Arc<dyn TypeMapping>> {
    let assertion = BeanTypeMapping::new(&SQL_ATTACK, "SqlAttackProtection", || {
        Box::new(SqlAttackAssertion::default())
    })
    .properties([
        Property::enabled(),
        Property::new::<SqlAttackAssertion>(
            "Protections",
            &SQL_PROTECTION_SET,
            |sql| Some(enum_set_to_value(&sql.protections)),
            |sql, value| {
                sql.protections = enum_set_value(value)?;
                Ok(())
            },
        ),
    ])
    .since(Version::new([5, 0]));
    vec![
        Arc::new(assertion),
        Arc::new(EnumSetTypeMapping::new::<SqlProtection>(
            &SQL_PROTECTION_SET,
            "sqlProtectionSet",
        )
        .since(Version::new([5, 0]))),
    ]
}
