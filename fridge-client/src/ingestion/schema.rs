use serde_json::json;

/// The JSON schema fridge analysis responses must follow.
pub fn fridge_scan_schema() -> serde_json::Value {
    json!({
        "type": "object",
        "properties": {
            "detectedIngredients": {
                "type": "array",
                "items": { "type": "string" }
            },
            "recipes": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "id": { "type": "string" },
                        "title": { "type": "string" },
                        "summary": { "type": "string" },
                        "difficulty": {
                            "type": "string",
                            "enum": ["Easy", "Medium", "Hard"]
                        },
                        "prepTime": { "type": "string" },
                        "calories": { "type": "number" },
                        "nutrition": {
                            "type": "object",
                            "properties": {
                                "protein": { "type": "number" },
                                "fat": { "type": "number" },
                                "carbs": { "type": "number" }
                            },
                            "required": ["protein", "fat", "carbs"]
                        },
                        "estimatedCost": { "type": "number" },
                        "imageUrl": { "type": "string" },
                        "imagePrompt": { "type": "string" },
                        "defaultServings": { "type": "integer" },
                        "ingredients": {
                            "type": "array",
                            "items": {
                                "type": "object",
                                "properties": {
                                    "name": { "type": "string" },
                                    "amount": { "type": "string" },
                                    "owned": { "type": "boolean" }
                                },
                                "required": ["name", "amount", "owned"]
                            }
                        },
                        "steps": {
                            "type": "array",
                            "items": { "type": "string" }
                        }
                    },
                    "required": [
                        "id", "title", "summary", "difficulty", "prepTime", "calories",
                        "nutrition", "estimatedCost", "ingredients", "steps",
                        "imagePrompt", "defaultServings"
                    ]
                }
            }
        },
        "required": ["detectedIngredients", "recipes"]
    })
}

/// The JSON schema for chef tips: an array of `{title, content}`.
pub fn tips_schema() -> serde_json::Value {
    json!({
        "type": "array",
        "items": {
            "type": "object",
            "properties": {
                "title": { "type": "string" },
                "content": { "type": "string" }
            },
            "required": ["title", "content"]
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recipe_schema_covers_the_model_fields() {
        let schema = fridge_scan_schema();
        let recipe = &schema["properties"]["recipes"]["items"];
        for field in ["id", "prepTime", "defaultServings", "ingredients", "steps"] {
            assert!(recipe["properties"].get(field).is_some(), "missing {field}");
        }
        assert_eq!(recipe["properties"]["difficulty"]["enum"][2], "Hard");
    }
}
