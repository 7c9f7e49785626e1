//! Framework matchers — recognize data-access operations on normalized
//! call chains.
//!
//! The engine runs candidates in priority order and returns the first
//! non-null result per chain; the raw-SQL matcher is the lowest-priority
//! fallback.

use std::collections::BTreeMap;

use crate::scanner::Language;

use super::sql::{looks_like_sql, parse_sql};
use super::types::{DataAccessMatch, DataOperation, UnifiedCallChain};

pub trait FrameworkMatcher: Send + Sync {
    fn id(&self) -> &'static str;
    fn languages(&self) -> &'static [Language];
    /// Higher runs earlier.
    fn priority(&self) -> u32;
    fn match_chain(&self, chain: &UnifiedCallChain) -> Option<DataAccessMatch>;
}

/// Priority-ordered matcher registry.
pub struct MatcherEngine {
    matchers: Vec<Box<dyn FrameworkMatcher>>,
}

impl MatcherEngine {
    /// Engine with the full built-in catalog.
    pub fn with_defaults() -> Self {
        let mut matchers: Vec<Box<dyn FrameworkMatcher>> = vec![
            Box::new(SqlxMatcher),
            Box::new(PrismaMatcher),
            Box::new(DrizzleMatcher),
            Box::new(SupabaseMatcher),
            Box::new(KnexMatcher),
            Box::new(SeaOrmMatcher),
            Box::new(DjangoMatcher),
            Box::new(TypeOrmMatcher),
            Box::new(DieselMatcher),
            Box::new(SqlAlchemyMatcher),
            Box::new(SequelizeMatcher),
            Box::new(MongooseMatcher),
            Box::new(RawSqlMatcher),
        ];
        matchers.sort_by(|a, b| b.priority().cmp(&a.priority()).then(a.id().cmp(b.id())));
        Self { matchers }
    }

    /// First matching result for a chain, respecting language support.
    pub fn match_chain(&self, chain: &UnifiedCallChain) -> Option<DataAccessMatch> {
        for matcher in &self.matchers {
            if !matcher.languages().contains(&chain.language) {
                continue;
            }
            if let Some(result) = matcher.match_chain(chain) {
                return Some(result);
            }
        }
        None
    }

    pub fn count(&self) -> usize {
        self.matchers.len()
    }
}

impl Default for MatcherEngine {
    fn default() -> Self {
        Self::with_defaults()
    }
}

// ---- helpers ----

const TS_JS: &[Language] = &[Language::TypeScript, Language::JavaScript];
const PY: &[Language] = &[Language::Python];
const RS: &[Language] = &[Language::Rust];

fn result(
    matcher_id: &str,
    chain: &UnifiedCallChain,
    table: Option<String>,
    fields: Vec<String>,
    operation: DataOperation,
    confidence: f64,
    is_raw_sql: bool,
) -> DataAccessMatch {
    let mut metadata = BTreeMap::new();
    metadata.insert("framework".to_string(), matcher_id.to_string());
    DataAccessMatch {
        matcher_id: matcher_id.to_string(),
        table,
        fields,
        operation,
        confidence,
        is_raw_sql,
        metadata,
        file: chain.file.clone(),
        line: chain.line,
    }
}

fn is_pascal_case(name: &str) -> bool {
    name.chars().next().is_some_and(|c| c.is_uppercase()) && !name.contains('_')
}

/// Classify a chain by its terminal recognized call: in fluent ORMs the
/// last method decides the operation (`filter(...).delete()` deletes).
fn op_from_table(
    chain: &UnifiedCallChain,
    table: &[(&str, DataOperation)],
) -> Option<DataOperation> {
    for segment in chain.segments.iter().rev() {
        if !segment.is_call {
            continue;
        }
        let lower = segment.name.to_lowercase();
        if let Some((_, op)) = table.iter().find(|(m, _)| *m == lower) {
            return Some(*op);
        }
    }
    None
}

// ---- TypeScript / JavaScript ----

struct PrismaMatcher;

const PRISMA_OPS: &[(&str, DataOperation)] = &[
    ("findmany", DataOperation::Read),
    ("findunique", DataOperation::Read),
    ("finduniqueorthrow", DataOperation::Read),
    ("findfirst", DataOperation::Read),
    ("findfirstorthrow", DataOperation::Read),
    ("count", DataOperation::Read),
    ("aggregate", DataOperation::Read),
    ("groupby", DataOperation::Read),
    ("create", DataOperation::Write),
    ("createmany", DataOperation::Write),
    ("update", DataOperation::Write),
    ("updatemany", DataOperation::Write),
    ("upsert", DataOperation::Write),
    ("delete", DataOperation::Delete),
    ("deletemany", DataOperation::Delete),
];

impl FrameworkMatcher for PrismaMatcher {
    fn id(&self) -> &'static str {
        "prisma"
    }
    fn languages(&self) -> &'static [Language] {
        TS_JS
    }
    fn priority(&self) -> u32 {
        100
    }

    fn match_chain(&self, chain: &UnifiedCallChain) -> Option<DataAccessMatch> {
        let receiver = chain.receiver.to_lowercase();
        if receiver != "prisma" && !receiver.ends_with("prisma") {
            return None;
        }
        let model = chain
            .segments
            .iter()
            .find(|s| !s.is_call)
            .map(|s| s.name.clone())?;
        let op = op_from_table(chain, PRISMA_OPS)?;
        Some(result(self.id(), chain, Some(model), Vec::new(), op, 0.95, false))
    }
}

struct DrizzleMatcher;

impl FrameworkMatcher for DrizzleMatcher {
    fn id(&self) -> &'static str {
        "drizzle"
    }
    fn languages(&self) -> &'static [Language] {
        TS_JS
    }
    fn priority(&self) -> u32 {
        95
    }

    fn match_chain(&self, chain: &UnifiedCallChain) -> Option<DataAccessMatch> {
        // db.select().from(users) / db.insert(users).values(…) /
        // db.update(users).set(…) / db.delete(users)
        let (op, table_segment) = if chain.has_segment("select") && chain.has_segment("from") {
            (DataOperation::Read, "from")
        } else if chain.has_segment("insert") {
            (DataOperation::Write, "insert")
        } else if chain.has_segment("update") && chain.has_segment("set") {
            (DataOperation::Write, "update")
        } else if chain.has_segment("delete") && chain.receiver == "db" {
            (DataOperation::Delete, "delete")
        } else {
            return None;
        };
        let table = chain
            .segment(table_segment)
            .and_then(|s| s.first_identifier_arg())
            .map(str::to_string)?;
        Some(result(self.id(), chain, Some(table), Vec::new(), op, 0.9, false))
    }
}

struct KnexMatcher;

impl FrameworkMatcher for KnexMatcher {
    fn id(&self) -> &'static str {
        "knex"
    }
    fn languages(&self) -> &'static [Language] {
        TS_JS
    }
    fn priority(&self) -> u32 {
        90
    }

    fn match_chain(&self, chain: &UnifiedCallChain) -> Option<DataAccessMatch> {
        if chain.receiver != "knex" {
            return None;
        }
        // knex('users').where(…).select('id', 'email')
        let head = chain.segments.first()?;
        if head.name != "knex" || !head.is_call {
            return None;
        }
        let table = head.first_string_arg()?.to_string();

        let op = if chain.has_segment("insert") {
            DataOperation::Write
        } else if chain.has_segment("update") {
            DataOperation::Write
        } else if chain.has_segment("del") || chain.has_segment("delete") {
            DataOperation::Delete
        } else {
            DataOperation::Read
        };

        let fields = chain
            .segment("select")
            .map(|s| {
                s.args
                    .iter()
                    .filter_map(|a| a.string_value.clone())
                    .collect()
            })
            .unwrap_or_default();

        Some(result(self.id(), chain, Some(table), fields, op, 0.9, false))
    }
}

struct TypeOrmMatcher;

const TYPEORM_OPS: &[(&str, DataOperation)] = &[
    ("find", DataOperation::Read),
    ("findone", DataOperation::Read),
    ("findoneby", DataOperation::Read),
    ("findby", DataOperation::Read),
    ("findandcount", DataOperation::Read),
    ("count", DataOperation::Read),
    ("createquerybuilder", DataOperation::Read),
    ("save", DataOperation::Write),
    ("insert", DataOperation::Write),
    ("update", DataOperation::Write),
    ("upsert", DataOperation::Write),
    ("delete", DataOperation::Delete),
    ("remove", DataOperation::Delete),
    ("softdelete", DataOperation::Delete),
];

impl FrameworkMatcher for TypeOrmMatcher {
    fn id(&self) -> &'static str {
        "typeorm"
    }
    fn languages(&self) -> &'static [Language] {
        TS_JS
    }
    fn priority(&self) -> u32 {
        85
    }

    fn match_chain(&self, chain: &UnifiedCallChain) -> Option<DataAccessMatch> {
        let receiver = &chain.receiver;
        let table = if let Some(stripped) = receiver
            .strip_suffix("Repository")
            .or_else(|| receiver.strip_suffix("Repo"))
        {
            let mut chars = stripped.chars();
            let first = chars.next()?;
            format!("{}{}", first.to_lowercase(), chars.as_str())
        } else {
            return None;
        };
        let op = op_from_table(chain, TYPEORM_OPS)?;
        Some(result(self.id(), chain, Some(table), Vec::new(), op, 0.85, false))
    }
}

struct SequelizeMatcher;

const SEQUELIZE_OPS: &[(&str, DataOperation)] = &[
    ("findall", DataOperation::Read),
    ("findone", DataOperation::Read),
    ("findbypk", DataOperation::Read),
    ("findandcountall", DataOperation::Read),
    ("count", DataOperation::Read),
    ("aggregate", DataOperation::Read),
    ("max", DataOperation::Read),
    ("min", DataOperation::Read),
    ("sum", DataOperation::Read),
    ("create", DataOperation::Write),
    ("bulkcreate", DataOperation::Write),
    ("findorcreate", DataOperation::Write),
    ("update", DataOperation::Write),
    ("upsert", DataOperation::Write),
    ("destroy", DataOperation::Delete),
];

impl FrameworkMatcher for SequelizeMatcher {
    fn id(&self) -> &'static str {
        "sequelize"
    }
    fn languages(&self) -> &'static [Language] {
        TS_JS
    }
    fn priority(&self) -> u32 {
        80
    }

    fn match_chain(&self, chain: &UnifiedCallChain) -> Option<DataAccessMatch> {
        if !is_pascal_case(&chain.receiver) {
            return None;
        }
        let op = op_from_table(chain, SEQUELIZE_OPS)?;
        Some(result(
            self.id(),
            chain,
            Some(chain.receiver.clone()),
            Vec::new(),
            op,
            0.85,
            false,
        ))
    }
}

struct MongooseMatcher;

const MONGOOSE_OPS: &[(&str, DataOperation)] = &[
    ("findbyid", DataOperation::Read),
    ("countdocuments", DataOperation::Read),
    ("insertmany", DataOperation::Write),
    ("findbyidandupdate", DataOperation::Write),
    ("updateone", DataOperation::Write),
    ("updatemany", DataOperation::Write),
    ("findbyidanddelete", DataOperation::Delete),
    ("deleteone", DataOperation::Delete),
    ("deletemany", DataOperation::Delete),
];

impl FrameworkMatcher for MongooseMatcher {
    fn id(&self) -> &'static str {
        "mongoose"
    }
    fn languages(&self) -> &'static [Language] {
        TS_JS
    }
    fn priority(&self) -> u32 {
        75
    }

    fn match_chain(&self, chain: &UnifiedCallChain) -> Option<DataAccessMatch> {
        if !is_pascal_case(&chain.receiver) {
            return None;
        }
        let op = op_from_table(chain, MONGOOSE_OPS)?;
        Some(result(
            self.id(),
            chain,
            Some(chain.receiver.clone()),
            Vec::new(),
            op,
            0.8,
            false,
        ))
    }
}

struct SupabaseMatcher;

impl FrameworkMatcher for SupabaseMatcher {
    fn id(&self) -> &'static str {
        "supabase"
    }
    fn languages(&self) -> &'static [Language] {
        TS_JS
    }
    fn priority(&self) -> u32 {
        92
    }

    fn match_chain(&self, chain: &UnifiedCallChain) -> Option<DataAccessMatch> {
        if !chain.receiver.to_lowercase().contains("supabase") && chain.receiver != "client" {
            return None;
        }
        let table = chain
            .segment("from")
            .and_then(|s| s.first_string_arg())
            .map(str::to_string)?;

        let op = if chain.has_segment("insert") || chain.has_segment("upsert") || chain.has_segment("update") {
            DataOperation::Write
        } else if chain.has_segment("delete") {
            DataOperation::Delete
        } else {
            DataOperation::Read
        };

        let fields = chain
            .segment("select")
            .and_then(|s| s.first_string_arg())
            .map(|arg| {
                arg.split(',')
                    .map(|f| f.trim().to_string())
                    .filter(|f| !f.is_empty() && f != "*")
                    .collect()
            })
            .unwrap_or_default();

        Some(result(self.id(), chain, Some(table), fields, op, 0.9, false))
    }
}

// ---- Python ----

struct DjangoMatcher;

const DJANGO_OPS: &[(&str, DataOperation)] = &[
    ("filter", DataOperation::Read),
    ("get", DataOperation::Read),
    ("all", DataOperation::Read),
    ("exclude", DataOperation::Read),
    ("values", DataOperation::Read),
    ("values_list", DataOperation::Read),
    ("annotate", DataOperation::Read),
    ("aggregate", DataOperation::Read),
    ("count", DataOperation::Read),
    ("first", DataOperation::Read),
    ("last", DataOperation::Read),
    ("exists", DataOperation::Read),
    ("create", DataOperation::Write),
    ("get_or_create", DataOperation::Write),
    ("update_or_create", DataOperation::Write),
    ("bulk_create", DataOperation::Write),
    ("update", DataOperation::Write),
    ("delete", DataOperation::Delete),
];

impl FrameworkMatcher for DjangoMatcher {
    fn id(&self) -> &'static str {
        "django"
    }
    fn languages(&self) -> &'static [Language] {
        PY
    }
    fn priority(&self) -> u32 {
        88
    }

    fn match_chain(&self, chain: &UnifiedCallChain) -> Option<DataAccessMatch> {
        let has_manager = chain
            .segments
            .iter()
            .any(|s| !s.is_call && s.name == "objects");
        if !has_manager {
            return None;
        }
        let op = op_from_table(chain, DJANGO_OPS)?;
        Some(result(
            self.id(),
            chain,
            Some(chain.receiver.clone()),
            Vec::new(),
            op,
            0.9,
            false,
        ))
    }
}

struct SqlAlchemyMatcher;

impl FrameworkMatcher for SqlAlchemyMatcher {
    fn id(&self) -> &'static str {
        "sqlalchemy"
    }
    fn languages(&self) -> &'static [Language] {
        PY
    }
    fn priority(&self) -> u32 {
        82
    }

    fn match_chain(&self, chain: &UnifiedCallChain) -> Option<DataAccessMatch> {
        let receiver = chain.receiver.to_lowercase();
        if receiver != "session" && receiver != "db" && !receiver.ends_with("session") {
            return None;
        }

        // session.execute("raw sql")
        if let Some(exec) = chain.segment("execute") {
            if let Some(raw) = exec.first_string_arg() {
                if looks_like_sql(raw) {
                    let facts = parse_sql(raw)?;
                    return Some(result(
                        self.id(),
                        chain,
                        facts.table,
                        facts.fields,
                        facts.operation,
                        0.85,
                        true,
                    ));
                }
            }
        }

        let table = chain
            .segment("query")
            .and_then(|s| s.first_identifier_arg())
            .map(str::to_string);

        let op = if chain.has_segment("delete") {
            DataOperation::Delete
        } else if chain.has_segment("add")
            || chain.has_segment("add_all")
            || chain.has_segment("merge")
            || chain.has_segment("bulk_save_objects")
        {
            DataOperation::Write
        } else if table.is_some() {
            DataOperation::Read
        } else {
            return None;
        };

        Some(result(self.id(), chain, table, Vec::new(), op, 0.8, false))
    }
}

// ---- Rust ----

struct SqlxMatcher;

impl FrameworkMatcher for SqlxMatcher {
    fn id(&self) -> &'static str {
        "sqlx"
    }
    fn languages(&self) -> &'static [Language] {
        RS
    }
    fn priority(&self) -> u32 {
        100
    }

    fn match_chain(&self, chain: &UnifiedCallChain) -> Option<DataAccessMatch> {
        if chain.receiver != "sqlx" {
            return None;
        }
        let query = chain.segments.iter().find(|s| {
            s.is_call && matches!(s.name.as_str(), "query" | "query_as" | "query_scalar" | "query_unchecked")
        })?;
        let raw = query.first_string_arg()?;
        let facts = parse_sql(raw)?;
        Some(result(
            self.id(),
            chain,
            facts.table,
            facts.fields,
            facts.operation,
            0.9,
            true,
        ))
    }
}

struct SeaOrmMatcher;

impl FrameworkMatcher for SeaOrmMatcher {
    fn id(&self) -> &'static str {
        "seaorm"
    }
    fn languages(&self) -> &'static [Language] {
        RS
    }
    fn priority(&self) -> u32 {
        90
    }

    fn match_chain(&self, chain: &UnifiedCallChain) -> Option<DataAccessMatch> {
        if !is_pascal_case(&chain.receiver) {
            return None;
        }
        let op = if chain.has_segment("find") || chain.has_segment("find_by_id") {
            DataOperation::Read
        } else if chain.has_segment("insert")
            || chain.has_segment("insert_many")
            || chain.has_segment("update")
            || chain.has_segment("update_many")
            || chain.has_segment("save")
        {
            DataOperation::Write
        } else if chain.has_segment("delete")
            || chain.has_segment("delete_by_id")
            || chain.has_segment("delete_many")
        {
            DataOperation::Delete
        } else {
            return None;
        };
        // Entity name approximates the table in snake_case.
        let table = to_snake_case(&chain.receiver);
        Some(result(self.id(), chain, Some(table), Vec::new(), op, 0.85, false))
    }
}

struct DieselMatcher;

impl FrameworkMatcher for DieselMatcher {
    fn id(&self) -> &'static str {
        "diesel"
    }
    fn languages(&self) -> &'static [Language] {
        RS
    }
    fn priority(&self) -> u32 {
        85
    }

    fn match_chain(&self, chain: &UnifiedCallChain) -> Option<DataAccessMatch> {
        // diesel::insert_into(users) / insert_into(users).values(…) /
        // diesel::update(users).set(…) / diesel::delete(users)
        let head = chain
            .segments
            .iter()
            .find(|s| s.is_call && matches!(s.name.as_str(), "insert_into" | "update" | "delete"));
        let from_builder = chain.receiver == "diesel"
            || matches!(chain.receiver.as_str(), "insert_into" | "update" | "delete");
        if let (Some(head), true) = (head, from_builder) {
            let table = head.first_identifier_arg().map(|t| {
                t.rsplit("::").next().unwrap_or(t).to_string()
            })?;
            let op = match head.name.as_str() {
                "insert_into" | "update" => DataOperation::Write,
                _ => DataOperation::Delete,
            };
            return Some(result(self.id(), chain, Some(table), Vec::new(), op, 0.85, false));
        }

        // users::table.filter(…).load::<User>(conn)
        let loads = chain.has_segment("load")
            || chain.has_segment("get_result")
            || chain.has_segment("get_results")
            || chain.has_segment("first");
        let has_table_path = chain.segments.iter().any(|s| !s.is_call && s.name == "table");
        if loads && has_table_path {
            return Some(result(
                self.id(),
                chain,
                Some(chain.receiver.clone()),
                Vec::new(),
                DataOperation::Read,
                0.8,
                false,
            ));
        }
        None
    }
}

// ---- fallback ----

struct RawSqlMatcher;

impl FrameworkMatcher for RawSqlMatcher {
    fn id(&self) -> &'static str {
        "raw-sql"
    }
    fn languages(&self) -> &'static [Language] {
        &[
            Language::TypeScript,
            Language::JavaScript,
            Language::Python,
            Language::Java,
            Language::CSharp,
            Language::Php,
            Language::Go,
            Language::Rust,
        ]
    }
    fn priority(&self) -> u32 {
        10
    }

    fn match_chain(&self, chain: &UnifiedCallChain) -> Option<DataAccessMatch> {
        for segment in &chain.segments {
            if !segment.is_call {
                continue;
            }
            if let Some(raw) = segment.first_string_arg() {
                if looks_like_sql(raw) {
                    let facts = parse_sql(raw)?;
                    return Some(result(
                        self.id(),
                        chain,
                        facts.table,
                        facts.fields,
                        facts.operation,
                        0.8,
                        true,
                    ));
                }
            }
        }
        None
    }
}

fn to_snake_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for (i, c) in name.chars().enumerate() {
        if c.is_uppercase() {
            if i > 0 {
                out.push('_');
            }
            out.extend(c.to_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}
