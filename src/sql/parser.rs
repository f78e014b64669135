//! Query parser: raw SQL text + dialect tag -> [`ParsedQuery`].
//!
//! Parsing never raises. A statement that the grammar rejects produces a
//! degraded `ParsedQuery` with [`QueryType::Unknown`] and the failure message
//! in `parse_errors`; a failure in one statement of a batch never aborts the
//! others.
//!
//! The walk extracts only what downstream classification needs: tables
//! (deduplicated), FROM-clause subqueries (synthetic `subquery_N` aliases,
//! SQL captured verbatim), SELECT-list columns with derivation/aggregation/
//! type inference, joins with their first equality condition decomposed,
//! CTEs, WHERE/HAVING text, GROUP BY/ORDER BY lists, and the weighted
//! complexity metrics.

use std::collections::HashSet;

use sqlparser::ast::{
    DuplicateTreatment, Expr, Function, FunctionArg, FunctionArgExpr, FunctionArguments,
    GroupByExpr, Join, JoinConstraint, JoinOperator, ObjectName, Query, Select, SelectItem,
    SetExpr, SetOperator, Statement, TableFactor, TableWithJoins, Value,
};
use sqlparser::parser::Parser;
use tracing::{debug, warn};

use super::dialect::Dialect;
use super::query::{
    AggregateKind, ColumnType, JoinKind, ParsedColumn, ParsedJoin, ParsedQuery, ParsedTable,
    QueryType,
};
use crate::hash::stable_id;

/// Maximum length of a column name synthesized from an expression fragment.
const FRAGMENT_NAME_LEN: usize = 50;

/// Function names treated as date-valued for type inference.
const DATE_FUNCTIONS: &[&str] = &["DATE", "TO_DATE", "DATE_TRUNC", "CURRENT_DATE", "LAST_DAY"];

/// Function names treated as timestamp-valued for type inference.
const TIMESTAMP_FUNCTIONS: &[&str] = &[
    "NOW",
    "CURRENT_TIMESTAMP",
    "GETDATE",
    "TO_TIMESTAMP",
    "SYSDATE",
];

/// Parse one SQL statement.
pub fn parse_query(sql: &str, dialect: Dialect) -> ParsedQuery {
    QueryParser::new(dialect).parse(sql)
}

/// Parse a batch of SQL statements.
pub fn parse_statements(sql: &str, dialect: Dialect) -> Vec<ParsedQuery> {
    QueryParser::new(dialect).parse_multiple(sql)
}

/// SQL query parser for one dialect.
#[derive(Debug, Clone, Copy)]
pub struct QueryParser {
    dialect: Dialect,
}

impl QueryParser {
    pub fn new(dialect: Dialect) -> Self {
        Self { dialect }
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// Parse a single statement into a [`ParsedQuery`]. Never fails: any
    /// grammar error degrades to `QueryType::Unknown` with the message
    /// captured in `parse_errors`.
    pub fn parse(&self, sql: &str) -> ParsedQuery {
        let trimmed = sql.trim();
        if trimmed.is_empty() {
            return ParsedQuery::failed(sql, self.dialect, "empty statement".into());
        }

        let statements = match Parser::parse_sql(self.dialect.grammar(), trimmed) {
            Ok(statements) => statements,
            Err(e) => {
                debug!(dialect = %self.dialect, "parse failed: {e}");
                return ParsedQuery::failed(sql, self.dialect, e.to_string());
            }
        };

        let Some(statement) = statements.first() else {
            return ParsedQuery::failed(sql, self.dialect, "no statement found".into());
        };
        if statements.len() > 1 {
            warn!(
                count = statements.len(),
                "parse() given multiple statements; using the first"
            );
        }

        let mut out = ParsedQuery::empty(sql, self.dialect);
        let mut walker = Walker::new(&mut out);
        walker.walk_statement(statement);
        out.metrics.finalize();
        out
    }

    /// Parse a batch of statements, each independently.
    ///
    /// Tries dialect-aware multi-statement parsing first; if the whole batch
    /// fails to parse, falls back to naive `;`-splitting so that one broken
    /// statement cannot take down its neighbors.
    pub fn parse_multiple(&self, sql: &str) -> Vec<ParsedQuery> {
        match Parser::parse_sql(self.dialect.grammar(), sql) {
            Ok(statements) => statements
                .iter()
                .map(|statement| self.parse(&statement.to_string()))
                .collect(),
            Err(e) => {
                debug!(dialect = %self.dialect, "batch parse failed, splitting on ';': {e}");
                sql.split(';')
                    .map(str::trim)
                    .filter(|fragment| !fragment.is_empty())
                    .map(|fragment| self.parse(fragment))
                    .collect()
            }
        }
    }
}

// =============================================================================
// AST Walker
// =============================================================================

/// Accumulates extraction results for one statement.
struct Walker<'a> {
    out: &'a mut ParsedQuery,
    seen_tables: HashSet<String>,
    subquery_counter: usize,
}

impl<'a> Walker<'a> {
    fn new(out: &'a mut ParsedQuery) -> Self {
        Self {
            out,
            seen_tables: HashSet::new(),
            subquery_counter: 0,
        }
    }

    fn walk_statement(&mut self, statement: &Statement) {
        match statement {
            Statement::Query(query) => {
                self.out.query_type = QueryType::Select;
                self.walk_query(query, true, 0);
            }
            Statement::Insert(insert) => {
                self.out.query_type = QueryType::Insert;
                if let Some(source) = &insert.source {
                    self.walk_query(source, true, 0);
                }
            }
            Statement::Update { .. } => {
                self.out.query_type = QueryType::Update;
            }
            Statement::Delete(_) => {
                self.out.query_type = QueryType::Delete;
            }
            Statement::CreateTable(create) => {
                self.out.query_type = QueryType::CreateTable;
                if let Some(query) = &create.query {
                    self.walk_query(query, true, 0);
                }
            }
            Statement::CreateView { query, .. } => {
                self.out.query_type = QueryType::CreateView;
                self.walk_query(query, true, 0);
            }
            _ => {
                // Parsed fine, just not a statement shape we extract from.
                self.out.query_type = QueryType::Unknown;
            }
        }
    }

    /// Walk a query node. `top` marks the outermost query of the statement:
    /// only its SELECT list, WHERE/HAVING, and GROUP BY/ORDER BY populate the
    /// column-level fields.
    fn walk_query(&mut self, query: &Query, top: bool, depth: usize) {
        if let Some(with) = &query.with {
            for cte in &with.cte_tables {
                let name = cte.alias.name.value.clone();
                let body = cte.query.to_string();
                self.out.ctes.insert(name, body);
            }
            if top {
                self.out.metrics.cte_count = self.out.ctes.len();
            }
        }

        self.walk_set_expr(&query.body, top, depth);

        if top {
            if let Some(order_by) = &query.order_by {
                self.out.metrics.has_order_by = !order_by.exprs.is_empty();
                self.out.order_by = order_by
                    .exprs
                    .iter()
                    .map(|o| o.expr.to_string())
                    .collect();
            }
            if query.limit.is_some() || query.fetch.is_some() {
                self.out.metrics.has_limit = true;
            }
        }

        // CTE bodies count toward nesting too
        if let Some(with) = &query.with {
            for cte in &with.cte_tables {
                self.walk_query(&cte.query, false, depth + 1);
            }
        }
    }

    fn walk_set_expr(&mut self, body: &SetExpr, top: bool, depth: usize) {
        match body {
            SetExpr::Select(select) => self.walk_select(select, top, depth),
            SetExpr::Query(query) => self.walk_query(query, top, depth),
            SetExpr::SetOperation {
                op, left, right, ..
            } => {
                if *op == SetOperator::Union {
                    self.out.metrics.has_union = true;
                }
                // Column shape comes from the first branch only.
                self.walk_set_expr(left, top, depth);
                self.walk_set_expr(right, false, depth);
            }
            _ => {}
        }
    }

    fn walk_select(&mut self, select: &Select, top: bool, depth: usize) {
        for table_with_joins in &select.from {
            self.add_relation(&table_with_joins.relation, depth);
            for join in &table_with_joins.joins {
                self.add_relation(&join.relation, depth);
                if let Some(parsed) = build_join(join) {
                    self.out.joins.push(parsed);
                    self.out.metrics.join_count += 1;
                }
            }
        }

        if top {
            for (position, item) in select.projection.iter().enumerate() {
                let column = self.build_column(item, position);
                self.out.columns.push(column);
            }
            self.out.metrics.column_count = self.out.columns.len();
            self.out.metrics.case_count = self
                .out
                .columns
                .iter()
                .filter(|c| c.is_case_statement)
                .count();
            self.out.metrics.aggregation_count = self
                .out
                .columns
                .iter()
                .filter(|c| c.aggregation.is_some())
                .count();
            self.out.metrics.has_window = select
                .projection
                .iter()
                .filter_map(select_item_expr)
                .any(contains_window);

            if let Some(selection) = &select.selection {
                self.out.where_clause = Some(selection.to_string());
                self.scan_expr_subqueries(selection, depth);
            }
            if let Some(having) = &select.having {
                self.out.having_clause = Some(having.to_string());
                self.out.metrics.has_having = true;
            }
            if let GroupByExpr::Expressions(exprs, _) = &select.group_by {
                if !exprs.is_empty() {
                    self.out.metrics.has_group_by = true;
                    self.out.group_by = exprs.iter().map(|e| e.to_string()).collect();
                }
            }
        } else if let Some(selection) = &select.selection {
            self.scan_expr_subqueries(selection, depth);
        }
    }

    /// Record a FROM-clause relation: a named table, a derived subquery
    /// (captured verbatim with a synthetic alias), or a nested join.
    fn add_relation(&mut self, relation: &TableFactor, depth: usize) {
        match relation {
            TableFactor::Table { name, alias, .. } => {
                let mut table = table_from_object_name(name);
                table.alias = alias.as_ref().map(|a| a.name.value.clone());
                self.add_table(table);
            }
            TableFactor::Derived {
                subquery, alias, ..
            } => {
                self.subquery_counter += 1;
                let synthetic = format!("subquery_{}", self.subquery_counter);
                let table = ParsedTable {
                    name: alias
                        .as_ref()
                        .map(|a| a.name.value.clone())
                        .unwrap_or_else(|| synthetic.clone()),
                    alias: Some(synthetic),
                    is_subquery: true,
                    subquery_sql: Some(subquery.to_string()),
                    ..Default::default()
                };
                self.add_table(table);
                self.out.metrics.subquery_count += 1;
                self.bump_depth(depth + 1);
                self.walk_query(subquery, false, depth + 1);
            }
            TableFactor::NestedJoin {
                table_with_joins, ..
            } => {
                self.add_relation(&table_with_joins.relation, depth);
                for join in &table_with_joins.joins {
                    self.add_relation(&join.relation, depth);
                    if let Some(parsed) = build_join(join) {
                        self.out.joins.push(parsed);
                        self.out.metrics.join_count += 1;
                    }
                }
            }
            _ => {}
        }
    }

    fn add_table(&mut self, table: ParsedTable) {
        let key = format!(
            "{:?}.{:?}.{}.{:?}",
            table.database, table.schema, table.name, table.alias
        );
        if self.seen_tables.insert(key) {
            self.out.tables.push(table);
            self.out.metrics.table_count += 1;
        }
    }

    fn bump_depth(&mut self, depth: usize) {
        if depth > self.out.metrics.nesting_depth {
            self.out.metrics.nesting_depth = depth;
        }
    }

    /// Count scalar subqueries appearing inside an expression (WHERE/HAVING)
    /// and walk them for tables and depth.
    fn scan_expr_subqueries(&mut self, expr: &Expr, depth: usize) {
        match expr {
            Expr::Subquery(query) => {
                self.out.metrics.subquery_count += 1;
                self.bump_depth(depth + 1);
                self.walk_query(query, false, depth + 1);
            }
            Expr::InSubquery { expr, subquery, .. } => {
                self.scan_expr_subqueries(expr, depth);
                self.out.metrics.subquery_count += 1;
                self.bump_depth(depth + 1);
                self.walk_query(subquery, false, depth + 1);
            }
            Expr::Exists { subquery, .. } => {
                self.out.metrics.subquery_count += 1;
                self.bump_depth(depth + 1);
                self.walk_query(subquery, false, depth + 1);
            }
            Expr::BinaryOp { left, right, .. } => {
                self.scan_expr_subqueries(left, depth);
                self.scan_expr_subqueries(right, depth);
            }
            Expr::UnaryOp { expr, .. } | Expr::Nested(expr) => {
                self.scan_expr_subqueries(expr, depth);
            }
            _ => {}
        }
    }

    // =========================================================================
    // Columns
    // =========================================================================

    fn build_column(&mut self, item: &SelectItem, position: usize) -> ParsedColumn {
        let (expr, alias) = match item {
            SelectItem::UnnamedExpr(expr) => (Some(expr), None),
            SelectItem::ExprWithAlias { expr, alias } => (Some(expr), Some(alias.value.clone())),
            SelectItem::Wildcard(_) => {
                return ParsedColumn {
                    name: "*".into(),
                    position,
                    ..Default::default()
                };
            }
            SelectItem::QualifiedWildcard(name, _) => {
                return ParsedColumn {
                    name: format!("{name}.*"),
                    position,
                    ..Default::default()
                };
            }
        };
        let expr = expr.expect("wildcards returned above");

        let name = alias.unwrap_or_else(|| infer_column_name(expr));
        let (table_ref, source_name) = source_reference(expr);

        let case_expr = find_case(expr);
        let aggregation = find_aggregate(expr);
        let is_derived = case_expr.is_some()
            || aggregation.is_some()
            || contains_binary_op(expr)
            || contains_function(expr);

        ParsedColumn {
            name,
            source_name,
            table_ref,
            is_derived,
            expression: is_derived.then(|| expr.to_string()),
            aggregation,
            data_type: infer_column_type(expr, case_expr.is_some(), aggregation, is_derived),
            is_case_statement: case_expr.is_some(),
            case_statement_id: case_expr.map(|c| stable_id("case", &c.to_string())),
            position,
        }
    }
}

// =============================================================================
// Tables & Joins
// =============================================================================

fn object_name_parts(name: &ObjectName) -> Vec<String> {
    name.0.iter().map(|ident| ident.value.clone()).collect()
}

/// Split a (possibly qualified) object name into database/schema/table.
fn table_from_object_name(name: &ObjectName) -> ParsedTable {
    let mut parts = object_name_parts(name);
    let table = parts.pop().unwrap_or_default();
    let schema = parts.pop();
    let database = parts.pop();
    ParsedTable {
        name: table,
        schema,
        database,
        ..Default::default()
    }
}

fn join_kind(operator: &JoinOperator) -> Option<JoinKind> {
    match operator {
        JoinOperator::Inner(_) => Some(JoinKind::Inner),
        JoinOperator::LeftOuter(_) => Some(JoinKind::Left),
        JoinOperator::RightOuter(_) => Some(JoinKind::Right),
        JoinOperator::FullOuter(_) => Some(JoinKind::Full),
        JoinOperator::CrossJoin => Some(JoinKind::Cross),
        _ => None,
    }
}

fn join_constraint(operator: &JoinOperator) -> Option<&Expr> {
    match operator {
        JoinOperator::Inner(JoinConstraint::On(expr))
        | JoinOperator::LeftOuter(JoinConstraint::On(expr))
        | JoinOperator::RightOuter(JoinConstraint::On(expr))
        | JoinOperator::FullOuter(JoinConstraint::On(expr)) => Some(expr),
        _ => None,
    }
}

fn build_join(join: &Join) -> Option<ParsedJoin> {
    let kind = join_kind(&join.join_operator)?;
    let table = relation_display_name(&join.relation);

    let mut parsed = ParsedJoin {
        kind,
        table,
        left_table: None,
        left_column: None,
        right_table: None,
        right_column: None,
        additional_conditions: Vec::new(),
        raw_condition: None,
    };

    if let Some(on) = join_constraint(&join.join_operator) {
        parsed.raw_condition = Some(on.to_string());
        let mut equalities = Vec::new();
        collect_equalities(on, &mut equalities);
        let mut iter = equalities.into_iter();
        if let Some((left, right)) = iter.next() {
            parsed.left_table = left.0;
            parsed.left_column = Some(left.1);
            parsed.right_table = right.0;
            parsed.right_column = Some(right.1);
        }
        for (left, right) in iter {
            parsed.additional_conditions.push(format!(
                "{} = {}",
                qualified(&left),
                qualified(&right)
            ));
        }
    }

    Some(parsed)
}

type ColumnOperand = (Option<String>, String);

fn qualified(operand: &ColumnOperand) -> String {
    match &operand.0 {
        Some(table) => format!("{}.{}", table, operand.1),
        None => operand.1.clone(),
    }
}

/// Pull `table.column = table.column` equalities out of an ON expression,
/// descending through ANDs.
fn collect_equalities(expr: &Expr, out: &mut Vec<(ColumnOperand, ColumnOperand)>) {
    use sqlparser::ast::BinaryOperator;
    if let Expr::BinaryOp { left, op, right } = expr {
        match op {
            BinaryOperator::And => {
                collect_equalities(left, out);
                collect_equalities(right, out);
            }
            BinaryOperator::Eq => {
                if let (Some(l), Some(r)) = (column_operand(left), column_operand(right)) {
                    out.push((l, r));
                }
            }
            _ => {}
        }
    } else if let Expr::Nested(inner) = expr {
        collect_equalities(inner, out);
    }
}

fn column_operand(expr: &Expr) -> Option<ColumnOperand> {
    match expr {
        Expr::Identifier(ident) => Some((None, ident.value.clone())),
        Expr::CompoundIdentifier(parts) if parts.len() >= 2 => {
            let column = parts.last()?.value.clone();
            let table = parts[parts.len() - 2].value.clone();
            Some((Some(table), column))
        }
        _ => None,
    }
}

fn relation_display_name(relation: &TableFactor) -> String {
    match relation {
        TableFactor::Table { name, .. } => name.to_string(),
        TableFactor::Derived { alias, .. } => alias
            .as_ref()
            .map(|a| a.name.value.clone())
            .unwrap_or_else(|| "subquery".into()),
        other => other.to_string(),
    }
}

// =============================================================================
// Expression inspection
// =============================================================================

fn select_item_expr(item: &SelectItem) -> Option<&Expr> {
    match item {
        SelectItem::UnnamedExpr(expr) => Some(expr),
        SelectItem::ExprWithAlias { expr, .. } => Some(expr),
        _ => None,
    }
}

/// Output name for an unaliased SELECT item: the column's own name if it is a
/// plain reference, otherwise a truncated fragment of the expression SQL.
fn infer_column_name(expr: &Expr) -> String {
    match expr {
        Expr::Identifier(ident) => ident.value.clone(),
        Expr::CompoundIdentifier(parts) => parts
            .last()
            .map(|p| p.value.clone())
            .unwrap_or_else(|| expr.to_string()),
        Expr::Function(function) => function.name.to_string().to_lowercase(),
        _ => {
            let sql = expr.to_string();
            sql.chars().take(FRAGMENT_NAME_LEN).collect()
        }
    }
}

/// `(table_ref, source_name)` when the expression is a plain column reference.
fn source_reference(expr: &Expr) -> (Option<String>, Option<String>) {
    match expr {
        Expr::Identifier(ident) => (None, Some(ident.value.clone())),
        Expr::CompoundIdentifier(parts) if parts.len() >= 2 => {
            let column = parts.last().map(|p| p.value.clone());
            let table = parts[parts.len() - 2].value.clone();
            (Some(table), column)
        }
        _ => (None, None),
    }
}

/// Visit every sub-expression, depth-first.
fn visit_expr<'e>(expr: &'e Expr, f: &mut dyn FnMut(&'e Expr)) {
    f(expr);
    match expr {
        Expr::BinaryOp { left, right, .. } => {
            visit_expr(left, f);
            visit_expr(right, f);
        }
        Expr::UnaryOp { expr, .. }
        | Expr::Nested(expr)
        | Expr::IsNull(expr)
        | Expr::IsNotNull(expr) => visit_expr(expr, f),
        Expr::Cast { expr, .. } => visit_expr(expr, f),
        Expr::Case {
            operand,
            conditions,
            results,
            else_result,
        } => {
            if let Some(operand) = operand {
                visit_expr(operand, f);
            }
            for condition in conditions {
                visit_expr(condition, f);
            }
            for result in results {
                visit_expr(result, f);
            }
            if let Some(else_result) = else_result {
                visit_expr(else_result, f);
            }
        }
        Expr::InList { expr, list, .. } => {
            visit_expr(expr, f);
            for item in list {
                visit_expr(item, f);
            }
        }
        Expr::Between {
            expr, low, high, ..
        } => {
            visit_expr(expr, f);
            visit_expr(low, f);
            visit_expr(high, f);
        }
        Expr::Like { expr, pattern, .. } | Expr::ILike { expr, pattern, .. } => {
            visit_expr(expr, f);
            visit_expr(pattern, f);
        }
        Expr::Function(function) => {
            if let FunctionArguments::List(list) = &function.args {
                for arg in &list.args {
                    if let FunctionArg::Unnamed(FunctionArgExpr::Expr(e))
                    | FunctionArg::Named {
                        arg: FunctionArgExpr::Expr(e),
                        ..
                    } = arg
                    {
                        visit_expr(e, f);
                    }
                }
            }
        }
        Expr::Tuple(items) => {
            for item in items {
                visit_expr(item, f);
            }
        }
        _ => {}
    }
}

/// First CASE node in the expression, outermost first.
pub(crate) fn find_case(expr: &Expr) -> Option<&Expr> {
    let mut found = None;
    visit_expr(expr, &mut |e| {
        if found.is_none() && matches!(e, Expr::Case { .. }) {
            found = Some(e);
        }
    });
    found
}

fn find_aggregate(expr: &Expr) -> Option<AggregateKind> {
    let mut found = None;
    visit_expr(expr, &mut |e| {
        if found.is_none() {
            if let Expr::Function(function) = e {
                found = aggregate_kind(function);
            }
        }
    });
    found
}

fn aggregate_kind(function: &Function) -> Option<AggregateKind> {
    let name = function.name.to_string().to_uppercase();
    let distinct = matches!(
        &function.args,
        FunctionArguments::List(list)
            if list.duplicate_treatment == Some(DuplicateTreatment::Distinct)
    );
    match name.as_str() {
        "SUM" => Some(AggregateKind::Sum),
        "AVG" => Some(AggregateKind::Avg),
        "COUNT" if distinct => Some(AggregateKind::CountDistinct),
        "COUNT" => Some(AggregateKind::Count),
        "MIN" => Some(AggregateKind::Min),
        "MAX" => Some(AggregateKind::Max),
        "LISTAGG" => Some(AggregateKind::ListAgg),
        "ARRAY_AGG" => Some(AggregateKind::ArrayAgg),
        _ => None,
    }
}

fn contains_binary_op(expr: &Expr) -> bool {
    let mut found = false;
    visit_expr(expr, &mut |e| {
        if matches!(e, Expr::BinaryOp { .. }) {
            found = true;
        }
    });
    found
}

fn contains_function(expr: &Expr) -> bool {
    let mut found = false;
    visit_expr(expr, &mut |e| {
        if matches!(e, Expr::Function(_)) {
            found = true;
        }
    });
    found
}

fn contains_window(expr: &Expr) -> bool {
    let mut found = false;
    visit_expr(expr, &mut |e| {
        if let Expr::Function(function) = e {
            if function.over.is_some() {
                found = true;
            }
        }
    });
    found
}

fn contains_division_or_round(expr: &Expr) -> bool {
    use sqlparser::ast::BinaryOperator;
    let mut found = false;
    visit_expr(expr, &mut |e| match e {
        Expr::BinaryOp { op, .. }
            if matches!(op, BinaryOperator::Multiply | BinaryOperator::Divide) =>
        {
            found = true;
        }
        Expr::Function(function) if function.name.to_string().eq_ignore_ascii_case("round") => {
            found = true;
        }
        _ => {}
    });
    found
}

/// Coarse data type for a SELECT-list column.
///
/// Order matters: literal kind, then CASE (string-valued classification
/// output), then date/time function names, then `*`/`/`/ROUND arithmetic,
/// then aggregate defaults, then string-if-derived.
fn infer_column_type(
    expr: &Expr,
    has_case: bool,
    aggregation: Option<AggregateKind>,
    is_derived: bool,
) -> ColumnType {
    if let Expr::Value(value) = expr {
        return match value {
            Value::Number(n, _) if n.contains('.') => ColumnType::Decimal,
            Value::Number(..) => ColumnType::Integer,
            Value::SingleQuotedString(_) | Value::DoubleQuotedString(_) => ColumnType::String,
            Value::Boolean(_) => ColumnType::Boolean,
            _ => ColumnType::Unknown,
        };
    }
    if has_case {
        return ColumnType::String;
    }
    if let Expr::Function(function) = expr {
        let name = function.name.to_string().to_uppercase();
        if DATE_FUNCTIONS.contains(&name.as_str()) {
            return ColumnType::Date;
        }
        if TIMESTAMP_FUNCTIONS.contains(&name.as_str()) {
            return ColumnType::Timestamp;
        }
    }
    if contains_division_or_round(expr) {
        return ColumnType::Decimal;
    }
    match aggregation {
        Some(AggregateKind::Count) | Some(AggregateKind::CountDistinct) => ColumnType::Integer,
        Some(AggregateKind::Sum) | Some(AggregateKind::Avg) => ColumnType::Decimal,
        _ if is_derived => ColumnType::String,
        _ => ColumnType::Unknown,
    }
}
