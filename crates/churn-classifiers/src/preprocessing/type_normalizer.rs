use crate::config::TypeNormalizerConfig;
use crate::data_handling::{parse_date, Column, Frame};
use crate::error::{ChurnError, Result};
use crate::preprocessing::TransformStage;

const STAGE: &str = "type normalizer";

/// Coerces configured columns to categorical text and to dates.
#[derive(Debug, Clone)]
pub struct TypeNormalizer {
    config: TypeNormalizerConfig,
}

impl TypeNormalizer {
    pub fn new(config: TypeNormalizerConfig) -> Self {
        TypeNormalizer { config }
    }

    /// Renders every cell as text; missing cells become `missing_level`.
    fn to_categorical(&self, name: &str, column: &Column) -> Column {
        if !matches!(column, Column::Categorical(_)) {
            log::trace!("Coercing column '{}' to categorical", name);
        }
        let missing = column.len() - column.non_missing();
        if missing > 0 {
            log::debug!(
                "Column '{}': {} missing cells mapped to level '{}'",
                name,
                missing,
                self.config.missing_level
            );
        }
        Column::Categorical(
            (0..column.len())
                .map(|row| Some(column.text_at(row).unwrap_or_else(|| self.config.missing_level.clone())))
                .collect(),
        )
    }

    fn to_date(&self, name: &str, column: &Column, frame: &Frame) -> Result<Column> {
        match column {
            Column::Date(_) => Ok(column.clone()),
            Column::Categorical(values) => values
                .iter()
                .zip(frame.keys())
                .map(|(cell, &key)| match cell {
                    Some(text) => parse_date(text, &self.config.date_formats)
                        .map(Some)
                        .ok_or_else(|| ChurnError::ParseError {
                            column: name.to_string(),
                            key,
                            value: text.clone(),
                            reason: "is not a recognized date".to_string(),
                        }),
                    None => Ok(None),
                })
                .collect::<Result<Vec<_>>>()
                .map(Column::Date),
            Column::Numeric(values) => {
                // an all-missing column carries no type information
                match values.iter().enumerate().find_map(|(row, v)| v.map(|v| (row, v))) {
                    None => Ok(Column::Date(vec![None; values.len()])),
                    Some((row, value)) => Err(ChurnError::ParseError {
                        column: name.to_string(),
                        key: frame.keys()[row],
                        value: value.to_string(),
                        reason: "is numeric, expected a date".to_string(),
                    }),
                }
            }
        }
    }
}

impl TransformStage for TypeNormalizer {
    fn name(&self) -> &str {
        STAGE
    }

    fn transform(&self, mut x: Frame) -> Result<Frame> {
        for name in &self.config.categorical_columns {
            let column = x
                .column(name)
                .ok_or_else(|| ChurnError::schema(STAGE, format!("column '{}' is not present", name)))?;
            let coerced = self.to_categorical(name, column);
            x.set_column(name.as_str(), coerced)?;
        }
        for name in &self.config.date_columns {
            let column = x
                .column(name)
                .ok_or_else(|| ChurnError::schema(STAGE, format!("column '{}' is not present", name)))?;
            let coerced = self.to_date(name, column, &x)?;
            x.set_column(name.as_str(), coerced)?;
        }
        Ok(x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn frame(dates: Vec<Option<&str>>) -> Frame {
        let n = dates.len() as u64;
        Frame::new((0..n).collect())
            .with_column(
                "city",
                Column::Numeric((0..n).map(|i| Some(i as f64)).collect()),
            )
            .unwrap()
            .with_column(
                "last_trip_date",
                Column::Categorical(dates.into_iter().map(|d| d.map(String::from)).collect()),
            )
            .unwrap()
    }

    fn normalizer() -> TypeNormalizer {
        TypeNormalizer::new(TypeNormalizerConfig {
            categorical_columns: vec!["city".to_string()],
            date_columns: vec!["last_trip_date".to_string()],
            ..TypeNormalizerConfig::default()
        })
    }

    #[test]
    fn coerces_text_and_dates() {
        let out = normalizer()
            .transform(frame(vec![Some("2014-01-25"), None]))
            .unwrap();
        assert_eq!(
            out.column("city"),
            Some(&Column::Categorical(vec![Some("0".into()), Some("1".into())]))
        );
        assert_eq!(
            out.column("last_trip_date"),
            Some(&Column::Date(vec![NaiveDate::from_ymd_opt(2014, 1, 25), None]))
        );
    }

    #[test]
    fn missing_categorical_cell_becomes_its_own_level() {
        let x = Frame::new(vec![0, 1, 2])
            .with_column(
                "phone",
                Column::Categorical(vec![Some("iPhone".into()), None, Some("Android".into())]),
            )
            .unwrap();
        let stage = TypeNormalizer::new(TypeNormalizerConfig {
            categorical_columns: vec!["phone".to_string()],
            date_columns: vec![],
            ..TypeNormalizerConfig::default()
        });
        let out = stage.transform(x).unwrap();
        assert_eq!(
            out.column("phone"),
            Some(&Column::Categorical(vec![
                Some("iPhone".into()),
                Some("nan".into()),
                Some("Android".into())
            ]))
        );
        assert_eq!(out.column("phone").unwrap().non_missing(), 3);
    }

    #[test]
    fn unparseable_date_is_a_parse_error() {
        let err = normalizer()
            .transform(frame(vec![Some("2014-01-25"), Some("soon")]))
            .unwrap_err();
        match err {
            ChurnError::ParseError { column, key, value, .. } => {
                assert_eq!(column, "last_trip_date");
                assert_eq!(key, 1);
                assert_eq!(value, "soon");
            }
            other => panic!("expected ParseError, got {:?}", other),
        }
    }

    #[test]
    fn missing_configured_column_is_schema_mismatch() {
        let x = Frame::new(vec![0]);
        assert!(matches!(
            normalizer().transform(x),
            Err(ChurnError::SchemaMismatch { .. })
        ));
    }
}
