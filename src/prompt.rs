//! Builds everything the model sees: the fixed persona instruction, the
//! per-request prompt block, the structured response schema, and the image
//! generation instruction. All of it is pure string/JSON assembly.

use serde_json::{json, Value};

use crate::domain::{Cuisine, FitnessGoal, FitnessProfile, HealthCondition, Mood};

/// Persona and behavioral rules for "Chef Boot". Sent as the system
/// instruction with every chat request.
pub const SYSTEM_INSTRUCTION: &str = r#"
أنت شيف مغربي مرح ومضحك اسمك "الشاف بوط". هدفك هو مساعدة المستخدمين على تحديد ما يأكلونه.
تحدث بالدارجة المغربية. كن ودودًا، واستخدم الفكهاة والأقوال المغربية.

**وضعية اللياقة البدنية (Fitness Mode):**
إذا قدم المستخدم هدفًا للياقة البدنية (بناء العضلات، تخسيس الوزن، الحفاظ على الوزن) وبياناته الشخصية (الجنس، الوزن، الطول، مستوى النشاط)، تحول إلى مدرب تغذية رياضي.
1.  قم بحساب احتياجاتهم اليومية من السعرات الحرارية والماكروز (بروتين، كربوهيدرات، دهون) بناءً على هدفهم وبياناتهم.
2.  اقترح وصفة تتناسب تمامًا مع هذه الاحتياجات.
3.  يجب أن يحتوي كائن 'recipe' على كائن 'macros' معبأ بالقيم المحسوبة للوصفة المقترحة.
    - بناء العضلات: ركز على البروتين العالي. "باش تبني دوك العضلات، خاصك بروتين مزيان! هاك هاد الوصفة عامرة بيه!".
    - تخسيس الوزن: ركز على السعرات الحرارية المنخفضة والألياف. "بغيتي تنقص الوزن؟ هاد الأكلة خفيفة ظريفة وغادي تشبعك بلا ما تحس بالذنب.".
    - الحفاظ على الوزن: اقترح وجبات متوازنة. "باش تبقى فالفورمة، خاصك ماكلة متوازنة. هاد الطبق فيه من كلشي شوية.".

**الوضعية العادية:**
إذا لم يتم تحديد هدف لياقة، اتبع السلوك العادي بناءً على المزاج والحالة الصحية.
- فرحان: اقترح شي حاجة مبهجة.
- كسلان: اقترح وصفة سريعة وسهلة.
- متوتر: اقترح شي حاجة مريحة.
- صحي: ركز على المكونات الصحية.
- احتفالي: اقترح طبق خاص.

تكيف مع الحالات الصحية:
- داء السكري: وصفات قليلة السكر.
- ارتفاع الضغط: تجنب الملح.
- الكوليسترول: وصفات قليلة الدهون.
- فقر الدم: ركز على الحديد.
- مشاكل القلب: وصفات صحية للقلب.

يجب أن ترد دائماً بصيغة JSON فقط، بدون أي نص قبله أو بعده.
"#;

/// Composes the per-request prompt block from the user's text and the
/// current filter selections. Pure and deterministic; never fails.
pub fn compose(
    user_text: &str,
    cuisine: Option<Cuisine>,
    mood: Option<Mood>,
    health_conditions: &[HealthCondition],
    fitness_goal: Option<FitnessGoal>,
    profile: &FitnessProfile,
) -> String {
    let cuisine_label = cuisine.map_or("أي نوع", |c| c.label());
    let mood_label = mood.map_or("غير محدد", |m| m.label());
    let conditions_label = if health_conditions.is_empty() {
        "لا يوجد".to_string()
    } else {
        health_conditions
            .iter()
            .map(|c| c.label())
            .collect::<Vec<_>>()
            .join(", ")
    };

    // The fitness sub-block is only attached when a goal is active and the
    // profile carries positive weight and height.
    let fitness_block = match fitness_goal {
        Some(goal) if profile.is_complete() => format!(
            "\nالهدف الرياضي: {}\nالجنس: {}\nالوزن: {} كغ\nالطول: {} سم\nمستوى النشاط: {}\n",
            goal.label(),
            profile.gender.label(),
            profile.weight_kg,
            profile.height_cm,
            profile.activity_level.label()
        ),
        _ => String::new(),
    };

    format!(
        "المستخدم يقول: \"{user_text}\"\nالمطبخ المفضل: {cuisine_label}\nمزاج المستخدم: {mood_label}\nالحالة الصحية: {conditions_label}\n{fitness_block}"
    )
}

/// The structured response schema the provider enforces on the model's
/// output: three optional top-level fields (recipe / chat / healthTips),
/// with healthTags constrained to the closed condition-label set.
pub fn response_schema() -> Value {
    let health_tag_labels: Vec<&str> = HealthCondition::ALL.iter().map(|c| c.label()).collect();
    json!({
        "type": "OBJECT",
        "properties": {
            "recipe": {
                "type": "OBJECT",
                "description": "يظهر هذا الكائن فقط إذا كان الرد وصفة.",
                "properties": {
                    "recipeName": { "type": "STRING", "description": "اسم الوصفة" },
                    "description": { "type": "STRING", "description": "وصف قصير وجذاب للطبق" },
                    "cuisine": { "type": "STRING", "description": "نوع المطبخ (مغربي, متوسطي, عالمي)" },
                    "ingredients": { "type": "ARRAY", "items": { "type": "STRING" }, "description": "قائمة المكونات" },
                    "preparationSteps": { "type": "ARRAY", "items": { "type": "STRING" }, "description": "خطوات التحضير" },
                    "imagePrompt": { "type": "STRING", "description": "وصف لتوليد صورة للطبق. يجب أن يكون وصفاً غنياً ومفصلاً باللغة الإنجليزية." },
                    "healthTags": {
                        "type": "ARRAY",
                        "items": { "type": "STRING", "enum": health_tag_labels },
                        "description": "قائمة بالحالات الصحية المناسبة لهذه الوصفة"
                    },
                    "macros": {
                        "type": "OBJECT",
                        "description": "يظهر هذا الكائن فقط للوصفات المتعلقة باللياقة البدنية",
                        "properties": {
                            "protein": { "type": "NUMBER", "description": "البروتين بالجرام" },
                            "carbs": { "type": "NUMBER", "description": "الكربوهيدرات بالجرام" },
                            "fats": { "type": "NUMBER", "description": "الدهون بالجرام" },
                            "calories": { "type": "NUMBER", "description": "السعرات الحرارية" }
                        }
                    }
                }
            },
            "chat": {
                "type": "OBJECT",
                "description": "يظهر هذا الكائن فقط إذا كان الرد رسالة دردشة.",
                "properties": {
                    "message": { "type": "STRING", "description": "محتوى رسالة الدردشة الودية" }
                }
            },
            "healthTips": {
                "type": "ARRAY",
                "items": { "type": "STRING" },
                "description": "نصائح صحية قصيرة ومفيدة بالدارجة المغربية. يمكن أن تظهر مع أي رد."
            }
        }
    })
}

/// Wraps a recipe's descriptive prompt with the fixed photographic styling
/// cues used for every generated dish image.
pub fn image_instruction(image_prompt: &str) -> String {
    format!(
        "A cinematic, professional food photography shot of {image_prompt}. \
        The lighting is bright and natural, and the dish is presented beautifully \
        on a rustic plate. Moroccan zellige patterns are visible in the background."
    )
}
