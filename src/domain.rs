use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Who authored a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Assistant,
}

/// Cuisine filter. The enum variant is the stable tag used by the local API;
/// `label()` is the Arabic string sent verbatim in prompts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Cuisine {
    Moroccan,
    Mediterranean,
    International,
}

impl Cuisine {
    pub const ALL: [Cuisine; 3] = [
        Cuisine::Moroccan,
        Cuisine::Mediterranean,
        Cuisine::International,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Cuisine::Moroccan => "مغربية",
            Cuisine::Mediterranean => "متوسطية",
            Cuisine::International => "عالمية",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mood {
    Happy,
    Lazy,
    Stressed,
    Healthy,
    Celebratory,
}

impl Mood {
    pub const ALL: [Mood; 5] = [
        Mood::Happy,
        Mood::Lazy,
        Mood::Stressed,
        Mood::Healthy,
        Mood::Celebratory,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Mood::Happy => "فرحان",
            Mood::Lazy => "كسلان",
            Mood::Stressed => "متوتر",
            Mood::Healthy => "صحي",
            Mood::Celebratory => "احتفالي",
        }
    }
}

/// Health conditions a user may select. Several can be active at once.
/// The Arabic labels double as the `healthTags` enum values the model is
/// constrained to, so changing a label changes the response-schema contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthCondition {
    Diabetes,
    HighBloodPressure,
    Cholesterol,
    Anemia,
    HeartIssues,
}

impl HealthCondition {
    pub const ALL: [HealthCondition; 5] = [
        HealthCondition::Diabetes,
        HealthCondition::HighBloodPressure,
        HealthCondition::Cholesterol,
        HealthCondition::Anemia,
        HealthCondition::HeartIssues,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            HealthCondition::Diabetes => "داء السكري",
            HealthCondition::HighBloodPressure => "ارتفاع الضغط",
            HealthCondition::Cholesterol => "الكوليسترول",
            HealthCondition::Anemia => "فقر الدم",
            HealthCondition::HeartIssues => "مشاكل القلب",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.label() == label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FitnessGoal {
    BuildMuscle,
    LoseWeight,
    MaintainWeight,
}

impl FitnessGoal {
    pub const ALL: [FitnessGoal; 3] = [
        FitnessGoal::BuildMuscle,
        FitnessGoal::LoseWeight,
        FitnessGoal::MaintainWeight,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            FitnessGoal::BuildMuscle => "بناء العضلات",
            FitnessGoal::LoseWeight => "تخسيس الوزن",
            FitnessGoal::MaintainWeight => "المحافظة على الوزن",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    Male,
    Female,
    #[default]
    Unspecified,
}

impl Gender {
    pub fn label(&self) -> &'static str {
        match self {
            Gender::Male => "ذكر",
            Gender::Female => "أنثى",
            Gender::Unspecified => "غير محدد",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityLevel {
    Low,
    Medium,
    High,
    #[default]
    Unspecified,
}

impl ActivityLevel {
    pub fn label(&self) -> &'static str {
        match self {
            ActivityLevel::Low => "منخفض",
            ActivityLevel::Medium => "متوسط",
            ActivityLevel::High => "عالي",
            ActivityLevel::Unspecified => "غير محدد",
        }
    }
}

/// Body data used by the fitness coaching mode. Only sent to the model when
/// a fitness goal is active and the profile is complete.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FitnessProfile {
    pub gender: Gender,
    pub weight_kg: f64,
    pub height_cm: f64,
    pub activity_level: ActivityLevel,
}

impl FitnessProfile {
    pub fn is_complete(&self) -> bool {
        self.weight_kg > 0.0 && self.height_cm > 0.0
    }
}

/// Nutritional breakdown for fitness-mode recipes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Macros {
    pub protein: f64,
    pub carbs: f64,
    pub fats: f64,
    pub calories: f64,
}

/// A recipe as returned by the model. Immutable once received.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    #[serde(rename = "recipeName")]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub cuisine: String,
    #[serde(default)]
    pub ingredients: Vec<String>,
    #[serde(default)]
    pub preparation_steps: Vec<String>,
    #[serde(default)]
    pub image_prompt: String,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_health_tags",
        deserialize_with = "deserialize_health_tags"
    )]
    pub health_tags: Option<Vec<HealthCondition>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub macros: Option<Macros>,
}

// healthTags travel on the wire as the Arabic label strings. Labels the
// model invents outside the closed set are dropped rather than failing the
// whole response.
fn serialize_health_tags<S>(
    tags: &Option<Vec<HealthCondition>>,
    serializer: S,
) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match tags {
        Some(tags) => serializer.collect_seq(tags.iter().map(|t| t.label())),
        None => serializer.serialize_none(),
    }
}

fn deserialize_health_tags<'de, D>(
    deserializer: D,
) -> Result<Option<Vec<HealthCondition>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<Vec<String>> = Option::deserialize(deserializer)?;
    Ok(raw.map(|labels| {
        labels
            .iter()
            .filter_map(|l| HealthCondition::from_label(l))
            .collect()
    }))
}

/// The `chat` object of a model reply.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatReply {
    #[serde(default)]
    pub message: String,
}

/// Parsed model reply. Every field is optional; "absent" and "empty" stay
/// distinguishable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipe: Option<Recipe>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chat: Option<ChatReply>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub health_tips: Option<Vec<String>>,
}

impl AiResponse {
    pub fn chat_only(message: impl Into<String>) -> Self {
        Self {
            chat: Some(ChatReply {
                message: message.into(),
            }),
            ..Self::default()
        }
    }

    /// A reply with neither a recipe nor chat text is the semantic failure
    /// the conversation turns into a synthesized apology.
    pub fn has_content(&self) -> bool {
        self.recipe.is_some() || self.chat.as_ref().is_some_and(|c| !c.message.is_empty())
    }
}

/// One entry of the conversation. Append-only; never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub id: u64,
    pub timestamp: String,
    pub sender: Sender,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recipe: Option<Recipe>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub health_tips: Option<Vec<String>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_condition_label_round_trip() {
        for condition in HealthCondition::ALL {
            assert_eq!(
                HealthCondition::from_label(condition.label()),
                Some(condition)
            );
        }
        assert_eq!(HealthCondition::from_label("nonsense"), None);
    }

    #[test]
    fn test_ai_response_all_fields_optional() {
        let parsed: AiResponse = serde_json::from_str("{}").unwrap();
        assert!(parsed.recipe.is_none());
        assert!(parsed.chat.is_none());
        assert!(parsed.health_tips.is_none());
        assert!(!parsed.has_content());
    }

    #[test]
    fn test_ai_response_empty_chat_message_is_not_content() {
        let parsed: AiResponse = serde_json::from_str(r#"{"chat":{"message":""}}"#).unwrap();
        assert!(!parsed.has_content());

        let parsed: AiResponse = serde_json::from_str(r#"{"chat":{"message":"اهلا"}}"#).unwrap();
        assert!(parsed.has_content());
    }

    #[test]
    fn test_recipe_wire_names_and_optional_macros() {
        let json = r#"{
            "recipe": {
                "recipeName": "طاجين الدجاج",
                "description": "طاجين بنين",
                "cuisine": "مغربية",
                "ingredients": ["دجاج", "زيتون"],
                "preparationSteps": ["قطع الدجاج", "طيب على نار هادئة"],
                "imagePrompt": "chicken tagine with olives",
                "healthTags": ["داء السكري"],
                "macros": {"protein": 42.0, "carbs": 30.0, "fats": 12.0, "calories": 510.0}
            },
            "healthTips": ["شرب الما بزاف"]
        }"#;
        let parsed: AiResponse = serde_json::from_str(json).unwrap();
        let recipe = parsed.recipe.unwrap();
        assert_eq!(recipe.name, "طاجين الدجاج");
        assert_eq!(recipe.preparation_steps.len(), 2);
        assert_eq!(recipe.image_prompt, "chicken tagine with olives");
        assert_eq!(recipe.health_tags, Some(vec![HealthCondition::Diabetes]));
        assert_eq!(recipe.macros.as_ref().unwrap().calories, 510.0);
        assert_eq!(parsed.health_tips.unwrap().len(), 1);
    }

    #[test]
    fn test_unknown_health_tag_labels_are_skipped() {
        // A label outside the closed set must not fail the whole parse.
        let json = r#"{
            "recipeName": "سلطة زيتون",
            "healthTags": ["وصفة الجدة", "فقر الدم", "خفيفة"]
        }"#;
        let recipe: Recipe = serde_json::from_str(json).unwrap();
        assert_eq!(recipe.health_tags, Some(vec![HealthCondition::Anemia]));

        // All-unknown labels degrade to an empty set, still not an error.
        let json = r#"{"recipeName": "سلطة", "healthTags": ["مخترعة"]}"#;
        let recipe: Recipe = serde_json::from_str(json).unwrap();
        assert_eq!(recipe.health_tags, Some(vec![]));
    }

    #[test]
    fn test_recipe_macros_absent_stays_none() {
        let json = r#"{"recipeName": "سلطة", "ingredients": [], "preparationSteps": []}"#;
        let recipe: Recipe = serde_json::from_str(json).unwrap();
        assert!(recipe.macros.is_none());
        assert!(recipe.health_tags.is_none());
    }

    #[test]
    fn test_health_tags_serialize_as_labels() {
        let recipe = Recipe {
            name: "حريرة".to_string(),
            health_tags: Some(vec![HealthCondition::Anemia]),
            ..Recipe::default()
        };
        let json = serde_json::to_value(&recipe).unwrap();
        assert_eq!(json["healthTags"][0], "فقر الدم");
    }

    #[test]
    fn test_fitness_profile_completeness() {
        let mut profile = FitnessProfile::default();
        assert!(!profile.is_complete());
        profile.weight_kg = 80.0;
        assert!(!profile.is_complete());
        profile.height_cm = 180.0;
        assert!(profile.is_complete());
    }
}
