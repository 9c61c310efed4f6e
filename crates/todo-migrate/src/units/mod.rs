//! Built-in change units for the todo-app schema.
//!
//! Each unit is a numbered `.sql` file embedded via `include_str!`. Add new
//! units to [`BUILTIN`]; ordinals must be unique and are never reused.

use crate::error::{MigrateError, MigrateResult};
use crate::registry::Registry;
use crate::unit::{ChangeUnit, Ordinal};

/// A change unit shipped with the application.
struct Builtin {
    ordinal: u32,
    name: &'static str,
    sql: &'static str,
}

static BUILTIN: &[Builtin] = &[
    Builtin {
        ordinal: 1,
        name: "create_users",
        sql: include_str!("v001_create_users.sql"),
    },
    Builtin {
        ordinal: 2,
        name: "create_todos",
        sql: include_str!("v002_create_todos.sql"),
    },
];

/// Registry holding every built-in change unit.
pub fn registry() -> MigrateResult<Registry> {
    let mut builder = Registry::builder();
    for unit in BUILTIN {
        let ordinal = Ordinal::new(unit.ordinal).ok_or_else(|| MigrateError::ZeroOrdinal {
            name: unit.name.to_string(),
        })?;
        builder = builder.register(ChangeUnit::sql(ordinal, unit.name, unit.sql));
    }
    builder.build()
}
