use crate::types::{MealSize, UserProfile};

const MANAGEMENT_RULES: &[&str] = &[
    "JOINT/LUNG HEALTH: Prioritize anti-inflammatory foods (Ginger, Turmeric, Omega-3s).",
    "DIABETES: Strict Zero-Sugar. Max fiber. No white rice/maida.",
    "BP/HEART: Zero deep-fry. Low salt. No processed meats.",
    "OBESITY: Focus on nutrient density over calorie density.",
];

pub fn build_recommendation_prompt(profile: &UserProfile, meal_size: MealSize, city: &str) -> String {
    let size = match meal_size {
        MealSize::Small => "Small",
        MealSize::Big => "Big",
    };
    let rules = MANAGEMENT_RULES
        .iter()
        .enumerate()
        .map(|(index, rule)| format!("{}. {}", index + 1, rule))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "Internal State: User is hungry.\n\
         Meal Size Request: {size}.\n\
         \n\
         PATIENT MEDICAL RECORD:\n\
         - Conditions: {conditions}\n\
         - Restrictions: {restrictions}\n\
         - Goals: {goals}\n\
         \n\
         MANAGEMENT RULES:\n\
         {rules}\n\
         \n\
         TASK: Recommend a specific dish from a {city} restaurant that fits these strict medical needs.\n\
         Format your response as a JSON: {{\"restaurant\": \"Name\", \"dish\": \"Dish Name\", \"rationale\": \"Medical Rationale\"}}",
        conditions = profile.conditions.join(", "),
        restrictions = profile.restrictions.join(", "),
        goals = profile.goals,
    )
}
