//! Parsers for the food.com CSV dumps.
//!
//! - RAW_interactions.csv: user_id,recipe_id,date,rating,review
//! - RAW_recipes.csv: name,id,minutes,contributor_id,submitted,tags,
//!   nutrition,n_steps,steps,description,ingredients,n_ingredients
//!
//! Rows are deserialized by header name with the `csv` crate, so extra or
//! reordered columns are tolerated. Review and description text may hold
//! quoted commas, doubled quotes and line breaks. List-valued recipe columns are
//! written as Python list literals (`['a', "b's"]`).

use crate::error::{DataLoadError, LoadResult};
use crate::types::*;
use csv::{ReaderBuilder, StringRecord, Trim};
use serde::Deserialize;
use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::Path;

const UTF8_BOM: char = '\u{feff}';

/// One row of RAW_interactions.csv; other columns are ignored
#[derive(Debug, Deserialize)]
struct InteractionRow {
    user_id: UserId,
    recipe_id: RecipeId,
    rating: f32,
}

/// One row of RAW_recipes.csv
///
/// List columns stay raw here and are decoded by `parse_list_literal`.
#[derive(Debug, Deserialize)]
struct RecipeRow {
    id: RecipeId,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    minutes: Option<String>,
    #[serde(default)]
    tags: Option<String>,
    #[serde(default)]
    nutrition: Option<String>,
    #[serde(default)]
    steps: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    ingredients: Option<String>,
}

fn open_file(path: &Path) -> LoadResult<File> {
    File::open(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => DataLoadError::FileNotFound {
            path: path.display().to_string(),
        },
        _ => DataLoadError::IoError(e),
    })
}

fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn csv_error(file: &str, err: csv::Error) -> DataLoadError {
    let line = err.position().map_or(0, |pos| pos.line() as usize);
    let reason = err.to_string();
    match err.into_kind() {
        csv::ErrorKind::Io(e) => DataLoadError::IoError(e),
        _ => DataLoadError::ParseError {
            file: file.to_string(),
            line,
            reason,
        },
    }
}

/// Open a CSV reader whose header row is cleaned and checked for `required`
///
/// A leading byte order mark and surrounding whitespace are removed from
/// the column names, so rows deserialize by name.
fn reader<R: Read>(source: R, file: &str, required: &[&str]) -> LoadResult<csv::Reader<R>> {
    let mut reader = ReaderBuilder::new().trim(Trim::All).from_reader(source);

    let headers: StringRecord = reader
        .headers()
        .map_err(|e| csv_error(file, e))?
        .iter()
        .map(|h| h.trim_start_matches(UTF8_BOM).trim())
        .collect();

    if let Some(missing) = required.iter().find(|c| !headers.iter().any(|h| h == **c)) {
        return Err(DataLoadError::MissingColumn {
            file: file.to_string(),
            column: missing.to_string(),
        });
    }

    reader.set_headers(headers);
    Ok(reader)
}

// =============================================================================
// Interactions
// =============================================================================

/// Parse the interactions file
pub fn parse_interactions(path: &Path) -> LoadResult<Vec<Interaction>> {
    interactions_from(open_file(path)?, &file_label(path))
}

/// Parse interaction CSV content already held in memory
///
/// `file` is only used to label errors.
pub fn parse_interactions_str(content: &str, file: &str) -> LoadResult<Vec<Interaction>> {
    interactions_from(content.as_bytes(), file)
}

fn interactions_from<R: Read>(source: R, file: &str) -> LoadResult<Vec<Interaction>> {
    let mut reader = reader(source, file, &["user_id", "recipe_id", "rating"])?;

    reader
        .deserialize::<InteractionRow>()
        .map(|row| {
            let row = row.map_err(|e| csv_error(file, e))?;
            if !row.rating.is_finite() {
                return Err(DataLoadError::InvalidValue {
                    field: "rating".to_string(),
                    value: row.rating.to_string(),
                });
            }
            Ok(Interaction::new(row.user_id, row.recipe_id, row.rating))
        })
        .collect()
}

// =============================================================================
// Recipes
// =============================================================================

/// Parse the recipes file
pub fn parse_recipes(path: &Path) -> LoadResult<Vec<RecipeDetail>> {
    recipes_from(open_file(path)?, &file_label(path))
}

/// Parse recipe CSV content already held in memory
pub fn parse_recipes_str(content: &str, file: &str) -> LoadResult<Vec<RecipeDetail>> {
    recipes_from(content.as_bytes(), file)
}

fn recipes_from<R: Read>(source: R, file: &str) -> LoadResult<Vec<RecipeDetail>> {
    let mut reader = reader(source, file, &["id"])?;

    reader
        .deserialize::<RecipeRow>()
        .map(|row| row.map(RecipeDetail::from).map_err(|e| csv_error(file, e)))
        .collect()
}

fn list(value: Option<&str>) -> Vec<String> {
    value.and_then(parse_list_literal).unwrap_or_default()
}

impl From<RecipeRow> for RecipeDetail {
    fn from(row: RecipeRow) -> Self {
        let non_empty = |value: Option<String>| value.filter(|s| !s.is_empty());

        RecipeDetail {
            id: row.id,
            name: non_empty(row.name),
            description: non_empty(row.description),
            ingredients: list(row.ingredients.as_deref())
                .into_iter()
                .map(|name| Ingredient {
                    name,
                    quantity: None,
                })
                .collect(),
            servings: None,
            preparation_minutes: row.minutes.and_then(|m| m.parse().ok()),
            steps: list(row.steps.as_deref()),
            image: None,
            nutrition: parse_nutrition(&list(row.nutrition.as_deref())),
            tags: list(row.tags.as_deref()),
        }
    }
}

/// Build nutrition facts from the seven-value list
fn parse_nutrition(values: &[String]) -> Option<Nutrition> {
    let numbers: Vec<f32> = values
        .iter()
        .map(|v| v.parse::<f32>())
        .collect::<std::result::Result<_, _>>()
        .ok()?;
    match numbers.as_slice() {
        &[calories, total_fat, sugar, sodium, protein, saturated_fat, carbohydrates] => {
            Some(Nutrition {
                calories,
                total_fat,
                sugar,
                sodium,
                protein,
                saturated_fat,
                carbohydrates,
            })
        }
        _ => None,
    }
}

/// Parse a Python list literal of strings or bare tokens
///
/// Example: "['salt', \"mom's gravy\", 3.5]" -> ["salt", "mom's gravy", "3.5"]
fn parse_list_literal(s: &str) -> Option<Vec<String>> {
    let inner = s.trim().strip_prefix('[')?.strip_suffix(']')?;
    let mut items = Vec::new();
    let mut chars = inner.chars().peekable();

    loop {
        while chars.peek().is_some_and(|c| c.is_whitespace()) {
            chars.next();
        }
        match chars.next() {
            None => break,
            Some(quote @ ('\'' | '"')) => {
                let mut item = String::new();
                loop {
                    match chars.next()? {
                        '\\' => item.push(chars.next()?),
                        c if c == quote => break,
                        c => item.push(c),
                    }
                }
                items.push(item);
            }
            Some(first) => {
                let mut item = String::from(first);
                while let Some(&c) = chars.peek() {
                    if c == ',' {
                        break;
                    }
                    item.push(c);
                    chars.next();
                }
                items.push(item.trim().to_string());
            }
        }
        while chars.peek().is_some_and(|c| c.is_whitespace()) {
            chars.next();
        }
        match chars.next() {
            Some(',') | None => {}
            Some(_) => return None,
        }
    }
    Some(items)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_interactions_drops_date_and_review() {
        let csv = "user_id,recipe_id,date,rating,review\n\
                   38094,40893,2003-02-17,4,\"Great with a salad, cooked on top of stove\"\n\
                   1293707,40893,2011-12-21,5,\"So simple, so delicious!\"\n";
        let interactions = parse_interactions_str(csv, "RAW_interactions.csv").unwrap();

        assert_eq!(interactions.len(), 2);
        assert_eq!(interactions[0], Interaction::new(38094, 40893, 4.0));
        assert_eq!(interactions[1], Interaction::new(1293707, 40893, 5.0));
    }

    #[test]
    fn test_review_with_newline_and_escaped_quotes() {
        let csv = "user_id,recipe_id,date,rating,review\r\n\
                   1,2,2005-01-01,5,\"Line one\nline \"\"two\"\"\"\r\n\
                   \r\n\
                   3,4,2005-01-02,0,\n";
        let interactions = parse_interactions_str(csv, "test.csv").unwrap();

        assert_eq!(interactions.len(), 2);
        assert_eq!(interactions[1], Interaction::new(3, 4, 0.0));
    }

    #[test]
    fn test_reordered_columns() {
        let csv = "rating,recipe_id,user_id\n3.5,20,10";
        let interactions = parse_interactions_str(csv, "test.csv").unwrap();
        assert_eq!(interactions, vec![Interaction::new(10, 20, 3.5)]);
    }

    #[test]
    fn test_missing_column() {
        let csv = "user_id,date,rating\n1,2005-01-01,5\n";
        let err = parse_interactions_str(csv, "test.csv").unwrap_err();
        assert!(matches!(err, DataLoadError::MissingColumn { ref column, .. } if column == "recipe_id"));
    }

    #[test]
    fn test_invalid_rating_reports_line() {
        let csv = "user_id,recipe_id,rating\n1,2,5\n1,3,great\n";
        let err = parse_interactions_str(csv, "test.csv").unwrap_err();
        assert!(matches!(err, DataLoadError::ParseError { line: 3, .. }));
    }

    #[test]
    fn test_quote_inside_unquoted_review_is_literal() {
        let csv = "user_id,recipe_id,date,rating,review\n\
                   1,2,2005-01-01,5,used a 9\" pan\n\
                   3,4,2005-01-02,4,fine\n";
        let interactions = parse_interactions_str(csv, "test.csv").unwrap();

        assert_eq!(
            interactions,
            vec![Interaction::new(1, 2, 5.0), Interaction::new(3, 4, 4.0)]
        );
    }

    #[test]
    fn test_header_with_byte_order_mark() {
        let csv = "\u{feff}user_id,recipe_id,date,rating,review\n7,8,2005-01-01,3,ok\n";
        let interactions = parse_interactions_str(csv, "test.csv").unwrap();
        assert_eq!(interactions, vec![Interaction::new(7, 8, 3.0)]);
    }

    #[test]
    fn test_short_record_is_rejected() {
        let csv = "user_id,recipe_id,rating\n1,2,5\n1,3\n";
        let err = parse_interactions_str(csv, "test.csv").unwrap_err();
        assert!(matches!(err, DataLoadError::ParseError { ref file, .. } if file == "test.csv"));
    }

    #[test]
    fn test_missing_file() {
        let err = parse_interactions(Path::new("/definitely/not/here.csv")).unwrap_err();
        assert!(matches!(err, DataLoadError::FileNotFound { .. }));
    }

    #[test]
    fn test_list_literal() {
        assert_eq!(
            parse_list_literal("['salt', \"mom's gravy\", 3.5]"),
            Some(vec![
                "salt".to_string(),
                "mom's gravy".to_string(),
                "3.5".to_string()
            ])
        );
        assert_eq!(parse_list_literal("[]"), Some(vec![]));
        assert_eq!(parse_list_literal("not a list"), None);
    }

    #[test]
    fn test_parse_recipes() {
        let csv = "name,id,minutes,contributor_id,submitted,tags,nutrition,n_steps,steps,description,ingredients,n_ingredients\n\
                   arriba baked winter squash,137739,55,47892,2005-09-16,\"['60-minutes-or-less', 'vegetables']\",\"[51.5, 0.0, 13.0, 0.0, 2.0, 0.0, 4.0]\",2,\"['make a choice', 'bake']\",\"autumn is my favorite time of year, to cook!\",\"['winter squash', 'mexican seasoning']\",2\n";
        let recipes = parse_recipes_str(csv, "RAW_recipes.csv").unwrap();

        assert_eq!(recipes.len(), 1);
        let recipe = &recipes[0];
        assert_eq!(recipe.id, 137739);
        assert_eq!(recipe.name.as_deref(), Some("arriba baked winter squash"));
        assert_eq!(recipe.preparation_minutes, Some(55));
        assert_eq!(recipe.tags, vec!["60-minutes-or-less", "vegetables"]);
        assert_eq!(recipe.steps.len(), 2);
        assert_eq!(recipe.ingredients[1].name, "mexican seasoning");
        assert!(recipe.ingredients[1].quantity.is_none());

        let nutrition = recipe.nutrition.unwrap();
        assert_eq!(nutrition.calories, 51.5);
        assert_eq!(nutrition.sugar, 13.0);
        assert_eq!(nutrition.carbohydrates, 4.0);
    }
}
