//! Table resolution.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use std::hash::{Hash, Hasher};

use serde::Serialize;

use super::{condition_subqueries, expr_subqueries};
use crate::ast::{JoinClause, Statement, TableSource};

/// Where a table reference occurs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TableKind {
    /// The FROM / UPDATE / DELETE / INSERT table.
    Main,
    /// A joined table.
    Join,
    /// A derived table or CTE.
    Subquery,
}

/// A table (or derived source) referenced by a statement.
///
/// Equality, ordering and hashing only look at `(name, alias)`.
#[derive(Debug, Clone, Serialize)]
pub struct TableRef {
    /// Table name, schema-qualified when written so; `None` for a derived
    /// source.
    pub name: Option<String>,
    /// Alias as written.
    pub alias: Option<String>,
    /// Where the reference occurs.
    pub kind: TableKind,
    /// Tables found inside the subquery this reference stands for.
    #[serde(skip_serializing_if = "BTreeSet::is_empty")]
    pub children: BTreeSet<TableRef>,
}

impl TableRef {
    /// A named table.
    #[must_use]
    pub fn named(name: impl Into<String>, alias: Option<String>, kind: TableKind) -> Self {
        Self {
            name: Some(name.into()),
            alias,
            kind,
            children: BTreeSet::new(),
        }
    }

    /// A derived source known only by its alias.
    #[must_use]
    pub const fn derived(alias: Option<String>, children: BTreeSet<Self>) -> Self {
        Self {
            name: None,
            alias,
            kind: TableKind::Subquery,
            children,
        }
    }

    /// Alias if present, otherwise the name.
    #[must_use]
    pub fn reference_name(&self) -> Option<&str> {
        self.alias.as_deref().or(self.name.as_deref())
    }
}

impl PartialEq for TableRef {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.alias == other.alias
    }
}

impl Eq for TableRef {}

impl Hash for TableRef {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
        self.alias.hash(state);
    }
}

impl PartialOrd for TableRef {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TableRef {
    fn cmp(&self, other: &Self) -> Ordering {
        (&self.name, &self.alias).cmp(&(&other.name, &other.alias))
    }
}

/// A CTE visible at the current point of the walk.
struct CteScope<'a> {
    name: &'a str,
    /// Tables inside the CTE's query (deep mode only).
    children: BTreeSet<TableRef>,
    referenced: bool,
}

struct Resolver<'a> {
    deep: bool,
    /// Report derived sources; otherwise only named tables.
    sources: bool,
    ctes: Vec<CteScope<'a>>,
}

impl<'a> Resolver<'a> {
    fn collect(&mut self, stmt: &'a Statement) -> BTreeSet<TableRef> {
        let mut out = BTreeSet::new();
        self.statement(stmt, &mut out);
        out
    }

    fn statement(&mut self, stmt: &'a Statement, out: &mut BTreeSet<TableRef>) {
        let scope = self.ctes.len();
        let mut nested = vec![];

        match stmt {
            Statement::Select(select) => {
                if let Some(with) = &select.with {
                    self.ctes.extend(with.ctes.iter().map(|cte| CteScope {
                        name: cte.name.as_str(),
                        children: BTreeSet::new(),
                        referenced: false,
                    }));
                    if self.deep {
                        for (i, cte) in with.ctes.iter().enumerate() {
                            let children = self.collect(&cte.query);
                            self.ctes[scope + i].children = children;
                        }
                    }
                }
                self.source(&select.from, TableKind::Main, out);
                self.joins(&select.joins, out);

                if self.deep {
                    for column in &select.columns {
                        expr_subqueries(&column.expr, &mut nested);
                    }
                    if let Some(cond) = &select.where_clause {
                        condition_subqueries(cond, &mut nested);
                    }
                    for expr in &select.group_by {
                        expr_subqueries(expr, &mut nested);
                    }
                    if let Some(cond) = &select.having {
                        condition_subqueries(cond, &mut nested);
                    }
                    for item in &select.order_by {
                        expr_subqueries(&item.expr, &mut nested);
                    }
                }
            }
            Statement::Insert(insert) => {
                self.source(&insert.table, TableKind::Main, out);
                if self.deep {
                    for (_, value) in insert.column_values() {
                        expr_subqueries(value, &mut nested);
                    }
                    for assignment in &insert.on_duplicate {
                        expr_subqueries(&assignment.value, &mut nested);
                    }
                }
            }
            Statement::Update(update) => {
                self.source(&update.table, TableKind::Main, out);
                self.joins(&update.joins, out);
                if self.deep {
                    for assignment in &update.assignments {
                        expr_subqueries(&assignment.value, &mut nested);
                    }
                    if let Some(cond) = &update.where_clause {
                        condition_subqueries(cond, &mut nested);
                    }
                }
            }
            Statement::Delete(delete) => {
                self.source(&delete.table, TableKind::Main, out);
                self.joins(&delete.joins, out);
                if self.deep {
                    if let Some(cond) = &delete.where_clause {
                        condition_subqueries(cond, &mut nested);
                    }
                }
            }
        }

        if self.deep {
            for join in stmt.joins() {
                if let Some(on) = &join.on {
                    condition_subqueries(on, &mut nested);
                }
            }
            // Unaliased subqueries: their tables are reported at this level.
            for query in nested {
                let found = self.collect(query);
                out.extend(found);
            }
        }

        // A CTE nobody references is still reported, under its own name.
        let deep = self.deep;
        let unused: Vec<_> = self
            .ctes
            .drain(scope..)
            .filter(|cte| deep && !cte.referenced)
            .collect();
        for cte in unused {
            self.derived(Some(cte.name.to_string()), cte.children, out);
        }
    }

    fn joins(&mut self, joins: &'a [JoinClause], out: &mut BTreeSet<TableRef>) {
        for join in joins {
            self.source(&join.table, TableKind::Join, out);
        }
    }

    fn source(&mut self, source: &'a TableSource, kind: TableKind, out: &mut BTreeSet<TableRef>) {
        if let TableSource::Table {
            schema: None,
            name,
            alias,
        } = source
        {
            if let Some(children) = self.reference_cte(name) {
                let alias = alias.clone().unwrap_or_else(|| name.clone());
                self.derived(Some(alias), children, out);
                return;
            }
        }
        match source {
            TableSource::Table { alias, .. } => {
                if let Some(name) = source.qualified_name() {
                    out.insert(TableRef::named(name, alias.clone(), kind));
                }
            }
            TableSource::Subquery { query, alias } => {
                let children = if self.deep {
                    self.collect(query)
                } else {
                    BTreeSet::new()
                };
                self.derived(alias.clone(), children, out);
            }
        }
    }

    /// Marks the innermost visible CTE called `name` as referenced and
    /// returns its tables.
    fn reference_cte(&mut self, name: &str) -> Option<BTreeSet<TableRef>> {
        let cte = self.ctes.iter_mut().rev().find(|cte| cte.name == name)?;
        cte.referenced = true;
        Some(cte.children.clone())
    }

    fn derived(
        &self,
        alias: Option<String>,
        children: BTreeSet<TableRef>,
        out: &mut BTreeSet<TableRef>,
    ) {
        if self.sources {
            out.insert(TableRef::derived(alias, children));
        } else {
            out.extend(children);
        }
    }
}

/// Named tables referenced by `stmt`.
///
/// In deep mode tables found inside subqueries and CTEs are included in the
/// same flat set.
#[must_use]
pub fn find_tables(stmt: &Statement, deep: bool) -> BTreeSet<TableRef> {
    Resolver {
        deep,
        sources: false,
        ctes: vec![],
    }
    .collect(stmt)
}

/// Named tables and derived sources referenced by `stmt`.
///
/// A derived table or CTE is reported with `name == None` under its alias.
/// In deep mode its tables become its `children`; tables of unaliased
/// subqueries (WHERE, select list, HAVING) are reported at top level.
#[must_use]
pub fn find_tables_or_sources(stmt: &Statement, deep: bool) -> BTreeSet<TableRef> {
    Resolver {
        deep,
        sources: true,
        ctes: vec![],
    }
    .collect(stmt)
}

/// Maps every alias and table name referenced anywhere in `stmt` to its
/// table name. Names of the outermost statement win over nested ones.
#[must_use]
pub fn alias_map(stmt: &Statement) -> BTreeMap<String, String> {
    let mut map = BTreeMap::new();
    let nested = find_tables(stmt, true);
    let direct = find_tables(stmt, false);
    for table in nested.iter().chain(direct.iter()) {
        let Some(name) = &table.name else {
            continue;
        };
        map.insert(name.clone(), name.clone());
        if let Some((_, bare)) = name.rsplit_once('.') {
            map.insert(bare.to_string(), name.clone());
        }
        if let Some(alias) = &table.alias {
            map.insert(alias.clone(), name.clone());
        }
    }
    map
}
