//! Strict response schema constraining the model to the assessment shape

use serde_json::{json, Value};

/// Schema passed in `generationConfig.responseSchema`. Enumerations here must
/// stay in lockstep with the closed types in [`crate::model`].
pub(crate) fn response_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "vehicleType": {
                "type": "STRING",
                "description": "Specific Vehicle Category (e.g., 'Scooter', '3-Wheeler', 'Car')"
            },
            "fraudRisk": {
                "type": "STRING",
                "enum": ["Low", "Medium", "High"],
                "description": "Assessment of potential fraud based on visible anomalies"
            },
            "damages": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "id": {
                            "type": "STRING",
                            "description": "Unique identifier for the damage"
                        },
                        "type": {
                            "type": "STRING",
                            "enum": [
                                "Dent", "Scratch", "Crack", "Broken Glass",
                                "Paint Damage", "Missing Part", "Other"
                            ]
                        },
                        "category": {
                            "type": "STRING",
                            "enum": ["Cosmetic", "Functional"],
                            "description": "Whether the damage is purely visual (Cosmetic) or affects operation/structure (Functional)"
                        },
                        "severity": {
                            "type": "STRING",
                            "enum": ["Low", "Medium", "High", "Critical"]
                        },
                        "description": {
                            "type": "STRING",
                            "description": "Short description of the damage"
                        },
                        "requiredPart": {
                            "type": "STRING",
                            "description": "The specific name of the vehicle part that is damaged (e.g. 'Front Bumper', 'Left Headlight', 'Windshield', 'Front Panel')."
                        },
                        "estimatedCost": {
                            "type": "NUMBER",
                            "description": "Estimated repair cost in INR (Indian Rupee)"
                        },
                        "repairCosts": {
                            "type": "OBJECT",
                            "properties": {
                                "labor": {
                                    "type": "NUMBER",
                                    "description": "Labor cost in INR"
                                },
                                "parts": {
                                    "type": "ARRAY",
                                    "items": {
                                        "type": "OBJECT",
                                        "properties": {
                                            "type": {
                                                "type": "STRING",
                                                "enum": ["Genuine", "Aftermarket", "Used"]
                                            },
                                            "price": {
                                                "type": "NUMBER",
                                                "description": "Price in INR"
                                            },
                                            "availability": {
                                                "type": "STRING",
                                                "description": "Availability status"
                                            }
                                        },
                                        "required": ["type", "price"]
                                    }
                                },
                                "bestOptionTotal": {
                                    "type": "NUMBER",
                                    "description": "Total best estimated cost"
                                }
                            },
                            "required": ["labor", "parts", "bestOptionTotal"]
                        },
                        "box_2d": {
                            "type": "ARRAY",
                            "description": "Bounding box coordinates [ymin, xmin, ymax, xmax] on a 0-1000 scale.",
                            "items": { "type": "NUMBER" }
                        }
                    },
                    "required": ["id", "type", "severity", "description", "estimatedCost", "repairCosts", "box_2d"]
                }
            },
            "totalEstimatedCost": {
                "type": "NUMBER",
                "description": "Sum of all estimated costs"
            },
            "summary": {
                "type": "STRING",
                "description": "Professional executive summary including vehicle identification and damage overview."
            },
            "confidenceScore": {
                "type": "NUMBER",
                "description": "Confidence score of the assessment between 0 and 1"
            }
        },
        "required": ["vehicleType", "fraudRisk", "damages", "totalEstimatedCost", "summary", "confidenceScore"]
    })
}
