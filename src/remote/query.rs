// Query model for the hosted table API.
//
// Filters, ordering and limits are held as data and rendered to the
// service's query-parameter dialect (`column=op.value`, `order=col.desc`)
// only at the transport boundary, so tests and mocks can inspect them
// structurally.

use serde_json::Value;

/// Comparison operators accepted by the table endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOp {
    Eq,
    Neq,
    Gt,
    Gte,
    Lt,
    Lte,
    Like,
    ILike,
    In,
    Is,
}

impl FilterOp {
    pub fn keyword(&self) -> &'static str {
        match self {
            FilterOp::Eq => "eq",
            FilterOp::Neq => "neq",
            FilterOp::Gt => "gt",
            FilterOp::Gte => "gte",
            FilterOp::Lt => "lt",
            FilterOp::Lte => "lte",
            FilterOp::Like => "like",
            FilterOp::ILike => "ilike",
            FilterOp::In => "in",
            FilterOp::Is => "is",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    pub column: String,
    pub op: FilterOp,
    pub value: Value,
}

impl Filter {
    pub fn new(column: impl Into<String>, op: FilterOp, value: impl Into<Value>) -> Self {
        Self { column: column.into(), op, value: value.into() }
    }

    /// Right-hand side of the rendered `column=op.value` parameter.
    pub fn rendered_value(&self) -> String {
        match self.op {
            FilterOp::In => {
                let items = match &self.value {
                    Value::Array(items) => items.iter().map(literal).collect::<Vec<_>>(),
                    other => vec![literal(other)],
                };
                format!("({})", items.join(","))
            }
            _ => literal(&self.value),
        }
    }

    pub fn as_param(&self) -> (String, String) {
        (self.column.clone(), format!("{}.{}", self.op.keyword(), self.rendered_value()))
    }
}

fn literal(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "null".to_string(),
        other => other.to_string(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn keyword(&self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderBy {
    pub column: String,
    pub direction: SortDirection,
}

/// A fully-described read against one table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectQuery {
    pub table: String,
    pub columns: Option<Vec<String>>,
    pub filters: Vec<Filter>,
    pub order: Vec<OrderBy>,
    pub limit: Option<u32>,
}

impl SelectQuery {
    /// Render the query-string pairs for the table endpoint.
    pub fn params(&self) -> Vec<(String, String)> {
        let mut params = Vec::new();
        if let Some(columns) = &self.columns {
            params.push(("select".to_string(), columns.join(",")));
        }
        for filter in &self.filters {
            params.push(filter.as_param());
        }
        if !self.order.is_empty() {
            let rendered = self
                .order
                .iter()
                .map(|o| format!("{}.{}", o.column, o.direction.keyword()))
                .collect::<Vec<_>>()
                .join(",");
            params.push(("order".to_string(), rendered));
        }
        if let Some(limit) = self.limit {
            params.push(("limit".to_string(), limit.to_string()));
        }
        params
    }

    /// First filter on `column`, if any. Mostly useful for assertions.
    pub fn filter_on(&self, column: &str) -> Option<&Filter> {
        self.filters.iter().find(|f| f.column == column)
    }
}

/// Fluent builder the views use to describe reads.
#[derive(Debug, Clone)]
pub struct TableQuery {
    query: SelectQuery,
}

impl TableQuery {
    pub fn from(table: impl Into<String>) -> Self {
        Self { query: SelectQuery { table: table.into(), ..Default::default() } }
    }

    pub fn select(mut self, columns: &[&str]) -> Self {
        self.query.columns = Some(columns.iter().map(|c| c.to_string()).collect());
        self
    }

    pub fn filter(mut self, column: impl Into<String>, op: FilterOp, value: impl Into<Value>) -> Self {
        self.query.filters.push(Filter::new(column, op, value));
        self
    }

    pub fn eq(self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filter(column, FilterOp::Eq, value)
    }

    pub fn gte(self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filter(column, FilterOp::Gte, value)
    }

    pub fn in_list<V: Into<Value>>(self, column: impl Into<String>, values: Vec<V>) -> Self {
        let items: Vec<Value> = values.into_iter().map(Into::into).collect();
        self.filter(column, FilterOp::In, Value::Array(items))
    }

    pub fn order(mut self, column: impl Into<String>, direction: SortDirection) -> Self {
        self.query.order.push(OrderBy { column: column.into(), direction });
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.query.limit = Some(limit);
        self
    }

    pub fn build(self) -> SelectQuery {
        self.query
    }
}
