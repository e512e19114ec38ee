//! Deterministic synthetic schema graphs for demos, tests and load checks.

use crate::schema::{
    Column, ColumnSource, ProcedureParameter, RelationshipEdge, ScalarFunction, SchemaGraph,
    StoredProcedure, TableNode, Trigger, ViewNode,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MockSize {
    pub tables: usize,
    pub views: usize,
    pub relationships: usize,
    pub triggers: usize,
    pub procedures: usize,
    pub functions: usize,
}

impl MockSize {
    /// Preset by name; anything unrecognised is `small`.
    pub fn preset(name: &str) -> Self {
        let (tables, views, relationships, triggers, procedures, functions) = match name {
            "medium" => (100, 20, 150, 30, 20, 20),
            "large" => (500, 50, 750, 100, 50, 50),
            "stress" => (2000, 200, 3000, 300, 150, 150),
            _ => (10, 3, 15, 5, 5, 5),
        };
        Self {
            tables,
            views,
            relationships,
            triggers,
            procedures,
            functions,
        }
    }
}

const SCHEMAS: [&str; 4] = ["dbo", "sales", "inventory", "hr"];

const TABLE_PREFIXES: [&str; 20] = [
    "Customer", "Order", "Product", "Category", "Employee", "Department", "Invoice", "Payment",
    "Shipment", "Supplier", "Warehouse", "Stock", "Account", "Transaction", "Report", "Log",
    "Audit", "Config", "Setting", "User",
];

const TABLE_SUFFIXES: [&str; 10] = [
    "", "s", "Detail", "History", "Archive", "Temp", "Backup", "Master", "Ref", "Lookup",
];

const COLUMN_NAMES: [&str; 20] = [
    "Name", "Description", "Status", "Type", "Code", "Value", "Amount", "Quantity", "Price",
    "CreatedAt", "UpdatedAt", "IsActive", "Priority", "Notes", "Email", "Phone", "City",
    "Country", "Rating", "Version",
];

const DATA_TYPES: [&str; 8] = [
    "int",
    "bigint",
    "nvarchar(100)",
    "nvarchar(255)",
    "decimal(18,2)",
    "datetime2",
    "bit",
    "uniqueidentifier",
];

pub const MIN_COLUMNS: usize = 5;
pub const MAX_COLUMNS: usize = 300;
/// Column counts of the first few tables and views, to exercise wide nodes
pub const WIDE_COLUMN_TIERS: [usize; 5] = [100, 150, 200, 250, 300];

const TABLE_SEED: usize = 200;
const VIEW_SEED: usize = 400;

fn mix(seed: usize, index: usize) -> usize {
    let mut h = seed.wrapping_add(index);
    h = h.wrapping_mul(2654435761);
    h ^= h >> 16;
    h
}

fn column_count(index: usize, seed: usize) -> usize {
    match WIDE_COLUMN_TIERS.get(index) {
        Some(&n) => n,
        None => MIN_COLUMNS + mix(seed, index) % (MAX_COLUMNS - MIN_COLUMNS + 1),
    }
}

fn pick<'a>(items: &[&'a str], seed: usize, index: usize) -> &'a str {
    items[mix(seed, index) % items.len()]
}

pub fn generate(size: &str) -> SchemaGraph {
    generate_with(MockSize::preset(size))
}

pub fn generate_with(size: MockSize) -> SchemaGraph {
    let mut tables = generate_tables(&size);
    let relationships = generate_relationships(&mut tables, &size);
    let views = generate_views(&tables, &size);
    let triggers = generate_triggers(&tables, &size);
    let stored_procedures = generate_procedures(&tables, &size);
    let scalar_functions = generate_functions(&tables, &size);

    SchemaGraph {
        tables,
        views,
        relationships,
        triggers,
        stored_procedures,
        scalar_functions,
    }
}

fn generate_tables(size: &MockSize) -> Vec<TableNode> {
    (0..size.tables)
        .map(|i| {
            let schema = SCHEMAS[i % SCHEMAS.len()].to_string();
            let name = format!(
                "{}{}{}",
                pick(&TABLE_PREFIXES, i, 0),
                pick(&TABLE_SUFFIXES, i, 1),
                i
            );

            let mut columns = vec![Column {
                name: "Id".to_string(),
                data_type: "int".to_string(),
                is_primary_key: true,
                ..Default::default()
            }];
            for c in 1..column_count(i, TABLE_SEED) {
                let salt = i * 1000 + c;
                columns.push(Column {
                    name: format!("{}{}", pick(&COLUMN_NAMES, salt, 3), c),
                    data_type: pick(&DATA_TYPES, salt, 4).to_string(),
                    is_nullable: mix(salt, 5) % 2 == 0,
                    ..Default::default()
                });
            }

            TableNode {
                id: format!("{}.{}", schema, name),
                name,
                schema,
                columns,
            }
        })
        .collect()
}

/// Also appends each foreign key column to its owning table so that every
/// column-level relationship resolves.
fn generate_relationships(tables: &mut [TableNode], size: &MockSize) -> Vec<RelationshipEdge> {
    if tables.len() < 2 {
        return vec![];
    }

    let count = size.relationships.min(tables.len() * 2);
    let mut relationships = Vec::with_capacity(count);

    for i in 0..count {
        let from_idx = mix(i, 10) % tables.len();
        let mut to_idx = mix(i, 11) % tables.len();
        if to_idx == from_idx {
            to_idx = (to_idx + 1) % tables.len();
        }

        let to_name = tables[to_idx].name.clone();
        let to_id = tables[to_idx].id.clone();
        let fk_column = format!("{}Id", to_name.trim_end_matches(|c: char| c.is_ascii_digit()));

        let from = &mut tables[from_idx];
        if !from.columns.iter().any(|c| c.name == fk_column) {
            from.columns.push(Column {
                name: fk_column.clone(),
                data_type: "int".to_string(),
                is_nullable: true,
                ..Default::default()
            });
        }

        relationships.push(RelationshipEdge {
            id: format!("FK_{}_{}_{}", from.name, to_name, i),
            from: from.id.clone(),
            to: to_id,
            from_column: Some(fk_column),
            to_column: Some("Id".to_string()),
        });
    }

    relationships
}

fn generate_views(tables: &[TableNode], size: &MockSize) -> Vec<ViewNode> {
    if tables.is_empty() {
        return vec![];
    }

    (0..size.views)
        .map(|i| {
            let schema = SCHEMAS[i % SCHEMAS.len()].to_string();
            let name = format!("vw_Report{}", i);

            let source_count = 1 + mix(i, 20) % 3usize.min(tables.len());
            let start = mix(i, 21) % tables.len();
            let sources: Vec<&TableNode> = (0..source_count)
                .map(|offset| &tables[(start + offset) % tables.len()])
                .collect();

            let columns = (0..column_count(i, VIEW_SEED))
                .map(|c| {
                    let salt = i * 1000 + c;
                    let table = sources[mix(salt, 22) % sources.len()];
                    let column = &table.columns[mix(salt, 23) % table.columns.len()];
                    Column {
                        name: format!("{}_{}_{}", table.name, column.name, c + 1),
                        data_type: column.data_type.clone(),
                        is_nullable: column.is_nullable,
                        is_primary_key: false,
                        source_columns: vec![ColumnSource {
                            table: table.id.clone(),
                            column: column.name.clone(),
                        }],
                        source_table: Some(table.id.clone()),
                        source_column: Some(column.name.clone()),
                    }
                })
                .collect();

            ViewNode {
                id: format!("{}.{}", schema, name),
                definition: format!("CREATE VIEW {} AS SELECT * FROM {}", name, sources[0].id),
                name,
                schema,
                columns,
                referenced_tables: sources.iter().map(|t| t.id.clone()).collect(),
            }
        })
        .collect()
}

fn generate_triggers(tables: &[TableNode], size: &MockSize) -> Vec<Trigger> {
    if tables.is_empty() {
        return vec![];
    }

    (0..size.triggers)
        .map(|i| {
            let table_idx = mix(i, 30) % tables.len();
            let table = &tables[table_idx];
            let name = format!("TR_{}_{}", table.name, i);

            let fires_on_insert = mix(i, 32) % 2 == 0;
            let fires_on_update = mix(i, 33) % 2 == 0 || !fires_on_insert;

            let mut affected_tables = vec![];
            if mix(i, 35) % 2 == 0 && tables.len() > 1 {
                let affected = (table_idx + 1 + mix(i, 36)) % tables.len();
                affected_tables.push(tables[affected].id.clone());
            }

            Trigger {
                id: format!("{}.{}", table.id, name),
                definition: format!("CREATE TRIGGER {} ON {}", name, table.id),
                name,
                schema: table.schema.clone(),
                table_id: table.id.clone(),
                trigger_type: pick(&["AFTER", "INSTEAD OF"], i, 31).to_string(),
                is_disabled: mix(i, 37) % 5 == 0,
                fires_on_insert,
                fires_on_update,
                fires_on_delete: mix(i, 34) % 3 == 0,
                referenced_tables: vec![],
                affected_tables,
            }
        })
        .collect()
}

fn parameters(i: usize, seed: usize, count: usize, output_last: bool) -> Vec<ProcedureParameter> {
    (0..count)
        .map(|p| ProcedureParameter {
            name: format!("@{}", pick(&COLUMN_NAMES, i * 10 + p, seed)),
            data_type: pick(&DATA_TYPES, i * 10 + p, seed + 1).to_string(),
            is_output: output_last && p == count - 1,
        })
        .collect()
}

fn pick_tables(tables: &[TableNode], i: usize, seed: usize, count: usize) -> Vec<String> {
    let mut ids: Vec<String> = Vec::with_capacity(count);
    for n in 0..count {
        let id = &tables[mix(i * 10 + n, seed) % tables.len()].id;
        if !ids.contains(id) {
            ids.push(id.clone());
        }
    }
    ids
}

fn generate_procedures(tables: &[TableNode], size: &MockSize) -> Vec<StoredProcedure> {
    const PREFIXES: [&str; 7] = [
        "Get", "Update", "Delete", "Insert", "Calculate", "Process", "Validate",
    ];

    (0..size.procedures)
        .map(|i| {
            let schema = SCHEMAS[i % SCHEMAS.len()].to_string();
            let prefix = pick(&PREFIXES, i, 40);
            let name = format!("{}Data{}", prefix, i);

            let (referenced_tables, affected_tables) = if tables.is_empty() {
                (vec![], vec![])
            } else {
                let writes = matches!(prefix, "Update" | "Delete" | "Insert");
                (
                    pick_tables(tables, i, 46, mix(i, 45) % 3),
                    if writes {
                        pick_tables(tables, i, 48, 1 + mix(i, 47) % 2)
                    } else {
                        vec![]
                    },
                )
            };

            StoredProcedure {
                id: format!("{}.{}", schema, name),
                definition: format!("CREATE PROCEDURE {}", name),
                name,
                schema,
                procedure_type: "SQL_STORED_PROCEDURE".to_string(),
                parameters: parameters(i, 42, 1 + mix(i, 41) % 4, mix(i, 44) % 3 == 0),
                referenced_tables,
                affected_tables,
            }
        })
        .collect()
}

fn generate_functions(tables: &[TableNode], size: &MockSize) -> Vec<ScalarFunction> {
    const PREFIXES: [&str; 5] = [
        "fn_Get", "fn_Calculate", "fn_Format", "fn_Validate", "fn_Convert",
    ];
    const RETURN_TYPES: [&str; 5] = ["int", "decimal(18,2)", "nvarchar(100)", "bit", "datetime2"];

    (0..size.functions)
        .map(|i| {
            let schema = SCHEMAS[i % SCHEMAS.len()].to_string();
            let name = format!("{}Value{}", pick(&PREFIXES, i, 50), i);

            let referenced_tables = if !tables.is_empty() && mix(i, 55) % 2 == 0 {
                vec![tables[mix(i, 56) % tables.len()].id.clone()]
            } else {
                vec![]
            };

            ScalarFunction {
                id: format!("{}.{}", schema, name),
                definition: format!("CREATE FUNCTION {}", name),
                name,
                schema,
                function_type: "SQL_SCALAR_FUNCTION".to_string(),
                parameters: parameters(i, 52, 1 + mix(i, 51) % 3, false),
                return_type: pick(&RETURN_TYPES, i, 54).to_string(),
                referenced_tables,
                affected_tables: vec![],
            }
        })
        .collect()
}
