use std::collections::BTreeMap;

use bson::Bson;
use serde::Deserialize;
use url::form_urlencoded;

use super::{
    Filter, Operator, Page, Predicate, QueryError, QuerySpec, SortKey, CREATED_AT, DEFAULT_PAGE,
    RESERVED_PARAMS,
};
use crate::schema::{FieldKind, Schema};

/// A single query parameter value.
///
/// - `name=value` is a [`ParamValue::Single`]
/// - `name[]=a&name[]=b` is a [`ParamValue::List`]
/// - `name[lte]=20000` is a [`ParamValue::Nested`]
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Single(String),
    List(Vec<String>),
    Nested(BTreeMap<String, ParamValue>),
}

impl ParamValue {
    /// Splits a comma separated value, skipping empty entries.
    /// Lists and indexed values (`name[0]=a&name[1]=b`) are split element by element.
    fn split_commas(&self) -> Vec<String> {
        match self {
            ParamValue::Single(value) => split(value),
            ParamValue::List(values) => values.iter().flat_map(|value| split(value)).collect(),
            ParamValue::Nested(values) => values.values().flat_map(Self::split_commas).collect(),
        }
    }
}

fn split(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(ToString::to_string)
        .collect()
}

/// All the query parameters of a request.
///
/// ```
/// use primitives::query::{ParamValue, QueryParams};
///
/// let params = QueryParams::parse("averageCost[lte]=20000&housing=true").unwrap();
///
/// assert_eq!(Some(&ParamValue::Single("true".into())), params.0.get("housing"));
/// assert!(matches!(params.0.get("averageCost"), Some(ParamValue::Nested(_))));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct QueryParams(pub BTreeMap<String, ParamValue>);

impl QueryParams {
    /// Parses a raw (still url-encoded) query string.
    /// Percent-encoded brackets (`%5B` and `%5D`) are accepted as well.
    ///
    /// A repeated plain key (`careers=a&careers=b`) becomes a [`ParamValue::List`].
    pub fn parse(raw_query: &str) -> Result<Self, QueryError> {
        let mut plain: BTreeMap<String, Vec<String>> = BTreeMap::new();
        let mut bracketed = vec![];

        for pair in raw_query.split('&').filter(|pair| !pair.is_empty()) {
            match form_urlencoded::parse(pair.as_bytes()).next() {
                Some((key, value)) if !key.contains('[') => {
                    plain.entry(key.into_owned()).or_default().push(value.into_owned())
                }
                _ => bracketed.push(pair),
            }
        }

        let QueryParams(mut params) = serde_qs::Config::new(5, false)
            .deserialize_str::<QueryParams>(&bracketed.join("&"))
            .map_err(|error| QueryError::Malformed(error.to_string()))?;

        for (key, mut values) in plain {
            if params.contains_key(&key) {
                return Err(QueryError::Malformed(format!(
                    "`{key}` is both a value and an operator"
                )));
            }

            let value = match values.len() {
                1 => ParamValue::Single(values.remove(0)),
                _ => ParamValue::List(values),
            };
            params.insert(key, value);
        }

        Ok(QueryParams(params))
    }

    /// Builds the typed [`QuerySpec`] for the given [`Schema`].
    ///
    /// The reserved parameters (`select`, `sort`, `page` & `limit`) are taken out first,
    /// every other parameter becomes a filter on the field with the same name.
    pub fn into_query(mut self, schema: &Schema, default_limit: u64) -> Result<QuerySpec, QueryError> {
        let [select, sort, page, limit] = RESERVED_PARAMS.map(|name| self.0.remove(name));

        let select = match select {
            Some(value) => select_fields(schema, &value)?,
            None => None,
        };

        let sort = match sort {
            Some(value) => sort_keys(schema, &value)?,
            None => vec![],
        };
        let sort = if sort.is_empty() {
            vec![SortKey::descending(CREATED_AT)]
        } else {
            sort
        };

        let page = Page::new(
            page.as_ref().and_then(parse_int).unwrap_or(DEFAULT_PAGE),
            limit.as_ref().and_then(parse_int).unwrap_or(default_limit),
        );

        let mut filter = Filter::new();
        for (field, value) in self.0 {
            let kind = schema
                .kind(&field)
                .ok_or_else(|| QueryError::UnknownField(field.clone()))?;

            if !kind.is_filterable() {
                return Err(QueryError::NotFilterable(field));
            }

            for predicate in predicates(&field, kind, value)? {
                filter = filter.with(field.clone(), predicate);
            }
        }

        Ok(QuerySpec {
            filter,
            select,
            sort,
            page,
            populate: None,
        })
    }
}

fn predicates(field: &str, kind: FieldKind, value: ParamValue) -> Result<Vec<Predicate>, QueryError> {
    match value {
        ParamValue::Single(raw) => Ok(vec![Predicate::Equals(typed(field, kind, &raw)?)]),
        ParamValue::List(raws) => {
            let values = raws
                .iter()
                .map(|raw| typed(field, kind, raw))
                .collect::<Result<_, _>>()?;

            Ok(vec![Predicate::In(values)])
        }
        ParamValue::Nested(operators) => operators
            .into_iter()
            .map(|(operator, value)| {
                let operator =
                    operator
                        .parse::<Operator>()
                        .map_err(|_| QueryError::UnknownOperator {
                            field: field.to_string(),
                            operator: operator.clone(),
                        })?;

                let single = |value: ParamValue| match value {
                    ParamValue::Single(raw) => typed(field, kind, &raw),
                    _ => Err(QueryError::Malformed(format!(
                        "`{field}[{operator}]` expects a single value"
                    ))),
                };

                Ok(match operator {
                    Operator::In => Predicate::In(
                        value
                            .split_commas()
                            .iter()
                            .map(|raw| typed(field, kind, raw))
                            .collect::<Result<_, _>>()?,
                    ),
                    Operator::Gt => Predicate::GreaterThan(single(value)?),
                    Operator::Gte => Predicate::GreaterOrEqual(single(value)?),
                    Operator::Lt => Predicate::LessThan(single(value)?),
                    Operator::Lte => Predicate::LessOrEqual(single(value)?),
                })
            })
            .collect(),
    }
}

fn typed(field: &str, kind: FieldKind, raw: &str) -> Result<Bson, QueryError> {
    kind.parse_value(raw)
        .ok_or_else(|| QueryError::InvalidValue {
            field: field.to_string(),
            kind,
            value: raw.to_string(),
        })
}

fn known_field(schema: &Schema, field: String) -> Result<String, QueryError> {
    if schema.contains(&field) {
        Ok(field)
    } else {
        Err(QueryError::UnknownField(field))
    }
}

/// `_id` is always selected and comes first, an empty `select` selects everything.
///
/// A sub-path (`location.state`) is dropped when its parent (`location`) is selected too.
fn select_fields(schema: &Schema, value: &ParamValue) -> Result<Option<Vec<String>>, QueryError> {
    let requested = value
        .split_commas()
        .into_iter()
        .map(|field| known_field(schema, field))
        .collect::<Result<Vec<_>, _>>()?;

    if requested.is_empty() {
        return Ok(None);
    }

    let mut fields = vec!["_id".to_string()];
    for field in &requested {
        let parent_selected = requested
            .iter()
            .any(|parent| field.starts_with(&format!("{parent}.")));

        if !parent_selected && !fields.contains(field) {
            fields.push(field.clone());
        }
    }

    Ok(Some(fields))
}

fn sort_keys(schema: &Schema, value: &ParamValue) -> Result<Vec<SortKey>, QueryError> {
    value
        .split_commas()
        .into_iter()
        .map(|key| match key.strip_prefix('-') {
            Some(field) => known_field(schema, field.to_string()).map(SortKey::descending),
            None => known_field(schema, key.clone()).map(SortKey::ascending),
        })
        .collect()
}

/// Parses the leading base-10 digits of the value, `0` is considered invalid.
fn parse_int(value: &ParamValue) -> Option<u64> {
    let raw = match value {
        ParamValue::Single(raw) => raw.trim(),
        _ => return None,
    };
    let digits_end = raw
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(raw.len());

    raw[..digits_end].parse::<u64>().ok().filter(|number| *number > 0)
}

#[cfg(test)]
mod test {
    use bson::oid::ObjectId;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::query::{Direction, DEFAULT_LIMIT};

    const SCHEMA: Schema = Schema::new(
        "bootcamps",
        &[
            ("name", FieldKind::String),
            ("description", FieldKind::String),
            ("averageCost", FieldKind::Number),
            ("housing", FieldKind::Boolean),
            ("careers", FieldKind::StringList),
            ("user", FieldKind::ObjectId),
            ("location", FieldKind::Embedded),
            ("location.state", FieldKind::String),
        ],
    );

    fn build(raw_query: &str) -> Result<QuerySpec, QueryError> {
        QueryParams::parse(raw_query)?.into_query(&SCHEMA, DEFAULT_LIMIT)
    }

    #[test]
    fn parses_nested_operators() {
        let params = QueryParams::parse("averageCost[lte]=20000&location.state=MA").unwrap();

        let expected = QueryParams(
            [
                (
                    "averageCost".to_string(),
                    ParamValue::Nested(
                        [("lte".to_string(), ParamValue::Single("20000".into()))]
                            .into_iter()
                            .collect(),
                    ),
                ),
                (
                    "location.state".to_string(),
                    ParamValue::Single("MA".into()),
                ),
            ]
            .into_iter()
            .collect(),
        );

        assert_eq!(expected, params);
    }

    #[test]
    fn accepts_percent_encoded_brackets() {
        let encoded = QueryParams::parse("averageCost%5Bgt%5D=100").unwrap();
        let plain = QueryParams::parse("averageCost[gt]=100").unwrap();

        assert_eq!(plain, encoded);
    }

    #[test]
    fn empty_query_has_defaults() {
        let query = build("").expect("Should build");

        assert!(query.filter.is_empty());
        assert_eq!(None, query.select);
        assert_eq!(vec![SortKey::descending("createdAt")], query.sort);
        assert_eq!(Page::new(1, 25), query.page);
        assert_eq!(None, query.populate);
    }

    #[test]
    fn reserved_params_are_not_filters() {
        let query = build("select=name&sort=name&page=2&limit=5&housing=true").expect("Should build");

        assert_eq!(Filter::eq("housing", true), query.filter);
    }

    #[test]
    fn translates_operators_to_typed_predicates() {
        let query = build("averageCost[gte]=1000&averageCost[lt]=20000").expect("Should build");

        assert_eq!(
            Filter::new()
                .with("averageCost", Predicate::GreaterOrEqual(Bson::Double(1000.0)))
                .with("averageCost", Predicate::LessThan(Bson::Double(20000.0))),
            query.filter
        );

        let query = build("averageCost[gt]=100").expect("Should build");
        assert_eq!(
            Filter::new().with("averageCost", Predicate::GreaterThan(Bson::Double(100.0))),
            query.filter
        );

        let query = build("averageCost[lte]=20000").expect("Should build");
        assert_eq!(
            Filter::new().with("averageCost", Predicate::LessOrEqual(Bson::Double(20000.0))),
            query.filter
        );
    }

    #[test]
    fn in_operator_accepts_comma_separated_and_lists() {
        let expected = Filter::new().with(
            "careers",
            Predicate::In(vec![
                Bson::String("Business".into()),
                Bson::String("UI/UX".into()),
            ]),
        );

        let comma_separated = build("careers[in]=Business,UI/UX").expect("Should build");
        assert_eq!(expected, comma_separated.filter);

        let list = build("careers[in][0]=Business&careers[in][1]=UI/UX").expect("Should build");
        assert_eq!(expected, list.filter);
    }

    #[test]
    fn values_are_converted_by_field_kind() {
        let user = ObjectId::new();
        let query = build(&format!("user={user}&housing=false&name=Devworks"))
            .expect("Should build");

        // `BTreeMap` orders the parameters by name
        assert_eq!(
            Filter::new()
                .with("housing", Predicate::Equals(Bson::Boolean(false)))
                .with("name", Predicate::Equals(Bson::String("Devworks".into())))
                .with("user", Predicate::Equals(Bson::ObjectId(user))),
            query.filter
        );
    }

    #[test]
    fn invalid_values_are_client_errors() {
        assert_eq!(
            Err(QueryError::InvalidValue {
                field: "averageCost".into(),
                kind: FieldKind::Number,
                value: "cheap".into(),
            }),
            build("averageCost[lte]=cheap")
        );

        assert_eq!(
            Err(QueryError::InvalidValue {
                field: "user".into(),
                kind: FieldKind::ObjectId,
                value: "123".into(),
            }),
            build("user=123")
        );

        assert_eq!(
            Err(QueryError::UnknownOperator {
                field: "averageCost".into(),
                operator: "ne".into(),
            }),
            build("averageCost[ne]=100")
        );

        assert_eq!(
            Err(QueryError::UnknownField("rating".into())),
            build("rating=5")
        );

        assert_eq!(
            Err(QueryError::NotFilterable("location".into())),
            build("location=Boston")
        );
    }

    #[test]
    fn select_always_contains_the_id() {
        let query = build("select=name,description,name").expect("Should build");

        assert_eq!(
            Some(vec![
                "_id".to_string(),
                "name".to_string(),
                "description".to_string()
            ]),
            query.select
        );

        assert_eq!(
            Err(QueryError::UnknownField("password".into())),
            build("select=name,password")
        );

        // the parent path already contains its sub-paths
        let query = build("select=location.state,name,location").expect("Should build");
        assert_eq!(
            Some(vec![
                "_id".to_string(),
                "name".to_string(),
                "location".to_string()
            ]),
            query.select
        );
    }

    #[test]
    fn empty_select_returns_all_fields() {
        assert_eq!(None, build("select=").expect("Should build").select);
        assert_eq!(None, build("select=,").expect("Should build").select);
    }

    #[test]
    fn repeated_keys_are_lists() {
        let params = QueryParams::parse("careers=Business&housing=true&careers=UI%2FUX").unwrap();

        assert_eq!(
            Some(&ParamValue::List(vec!["Business".into(), "UI/UX".into()])),
            params.0.get("careers")
        );
        assert_eq!(Some(&ParamValue::Single("true".into())), params.0.get("housing"));

        let query = params.into_query(&SCHEMA, DEFAULT_LIMIT).expect("Should build");
        assert_eq!(
            Filter::new()
                .with(
                    "careers",
                    Predicate::In(vec![
                        Bson::String("Business".into()),
                        Bson::String("UI/UX".into()),
                    ]),
                )
                .with("housing", Predicate::Equals(Bson::Boolean(true))),
            query.filter
        );

        assert!(matches!(
            QueryParams::parse("averageCost=100&averageCost[lte]=200"),
            Err(QueryError::Malformed(_))
        ));
    }

    #[test]
    fn sort_keys_keep_their_order_and_direction() {
        let query = build("sort=name,-createdAt").expect("Should build");

        assert_eq!(
            vec![SortKey::ascending("name"), SortKey::descending("createdAt")],
            query.sort
        );
        assert_eq!(Direction::Descending, query.sort[1].direction);

        // an empty `sort` falls back to the default
        let query = build("sort=").expect("Should build");
        assert_eq!(vec![SortKey::descending("createdAt")], query.sort);
    }

    #[test]
    fn page_and_limit_fall_back_to_defaults() {
        assert_eq!(Page::new(3, 10), build("page=3&limit=10").unwrap().page);
        // leading digits are used
        assert_eq!(Page::new(2, 25), build("page=2abc").unwrap().page);
        assert_eq!(Page::new(1, 25), build("page=abc&limit=-5").unwrap().page);
        assert_eq!(Page::new(1, 25), build("page=0&limit=0").unwrap().page);

        let custom_default = QueryParams::parse("page=4")
            .unwrap()
            .into_query(&SCHEMA, 50)
            .unwrap();
        assert_eq!(Page::new(4, 50), custom_default.page);
    }
}
