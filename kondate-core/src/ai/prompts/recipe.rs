//! Recipe generation prompts.
//!
//! Every prompt is `base template + mode section + JSON-only instruction`.
//! Rendering is pure; the same request and tier always give the same text.

use crate::types::{Constraints, GenerationRequest, Tier};

/// JSON example for the flat payload shape. Kept as valid JSON.
pub const STANDARD_JSON_TEMPLATE: &str = r#"{
  "title": "レシピ名",
  "cooking_time": 30,
  "servings": 2,
  "calories": 450,
  "tags": ["時短", "簡単"],
  "category": "和食",
  "ingredients": [
    {"name": "食材名", "amount": "分量"}
  ],
  "instructions": [
    "手順1",
    "手順2",
    "手順3"
  ]
}"#;

/// JSON example for the nested payload shape with nutrition analysis.
pub const PRO_JSON_TEMPLATE: &str = r#"{
  "recipe": {
    "title": "レシピ名",
    "cooking_time": 30,
    "servings": 2,
    "calories": 450,
    "tags": ["ヘルシー"],
    "category": "和食",
    "instructions": ["手順1", "手順2", "手順3"]
  },
  "recipe_ingredients": [
    {
      "name": "食材名",
      "amount": "分量",
      "nutrition_notes": "この料理における栄養面での役割",
      "cooking_method_tips": "この料理での下ごしらえや加熱のコツ"
    }
  ],
  "nutrition_master": [
    {
      "ingredient_name": "食材名",
      "nutrition_facts": {
        "calories_per_100g": 0,
        "protein": 0,
        "fat": 0,
        "carbohydrates": 0,
        "vitamins": ["ビタミン名"],
        "minerals": ["ミネラル名"]
      },
      "health_benefits": ["期待できる健康効果"],
      "cooking_tips": ["栄養を逃がさない調理のコツ"]
    }
  ]
}"#;

const JSON_ONLY_INSTRUCTION: &str = "回答はJSONのみとし、JSON以外の説明文やコードブロック記号は出力しないでください。";

const BASE_RULES: &str = "制約:
- 調理時間は5-60分
- 人数は1-6人分
- カロリーは50-1500kcal
- 材料は2-15個
- 手順は3-15個
- 実際に作れる現実的なレシピ
- 日本の家庭で手に入る材料を使用";

const PRO_RULES: &str = "- recipe_ingredientsの各材料にこの料理での栄養メモと調理のコツを付ける
- nutrition_masterには主要な材料ごとに100gあたりの栄養成分、健康効果、調理のコツを記載する
- 栄養成分の数値は一般的な食品成分表に基づく概算値とする";

fn base_prompt(tier: Tier) -> String {
    match tier {
        Tier::Standard => format!(
            "以下の条件で日本の家庭料理レシピを1つ生成してください。必ず次のJSON形式で回答してください。\n\n{STANDARD_JSON_TEMPLATE}\n\n{BASE_RULES}"
        ),
        Tier::Pro => format!(
            "以下の条件で日本の家庭料理レシピを1つ生成し、使用する材料の栄養分析も行ってください。必ず次のJSON形式で回答してください。\n\n{PRO_JSON_TEMPLATE}\n\n{BASE_RULES}\n{PRO_RULES}"
        ),
    }
}

fn category_section(category: &str) -> String {
    let guidance = match category {
        "和食" => Some("だし、醤油、味噌、みりんなどを使った日本料理にしてください。"),
        "洋食" => Some("バター、トマト、チーズ、ハーブなどを使った西洋風の家庭料理にしてください。"),
        "中華" => Some("ごま油、オイスターソース、豆板醤などを使った中華料理にしてください。"),
        "イタリアン" => Some("オリーブオイル、にんにく、トマト、チーズを使ったイタリア料理にしてください。"),
        "フレンチ" => Some("バター、生クリーム、ワイン、ハーブを使ったフランス料理を家庭向けにしてください。"),
        "その他" => Some("エスニックや創作料理など、上記以外のジャンルの料理にしてください。"),
        _ => None,
    };

    match guidance {
        Some(guidance) => format!("カテゴリ: {category}\n{guidance}"),
        None => format!("カテゴリ: {category}"),
    }
}

fn ingredients_section(ingredients: &[String]) -> String {
    format!(
        "指定食材: {}\n上記の食材を必ずすべて使用してレシピを作成してください。",
        ingredients.join(", ")
    )
}

/// One bullet per present constraint; `None` when nothing is constrained.
fn constraints_section(constraints: &Constraints) -> Option<String> {
    if constraints.is_empty() {
        return None;
    }

    let mut bullets = Vec::new();

    if let Some(max_time) = constraints.max_time {
        bullets.push(format!("- 調理時間: {max_time}分以内"));
    }
    if let Some(tags) = constraints.tags.as_ref().filter(|t| !t.is_empty()) {
        bullets.push(format!("- タグ: {}", tags.join(", ")));
    }
    if let Some(difficulty) = constraints.difficulty.as_ref().filter(|d| !d.is_empty()) {
        bullets.push(format!("- 難易度: {difficulty}"));
    }

    Some(format!(
        "制約条件:\n{}\n\n上記条件を満たすレシピを作成してください。",
        bullets.join("\n")
    ))
}

/// Render the generation prompt for a request.
pub fn build_prompt(request: &GenerationRequest, tier: Tier) -> String {
    let section = match request {
        GenerationRequest::Basic { category } => category
            .as_deref()
            .filter(|c| !c.is_empty())
            .map(category_section),
        GenerationRequest::ByIngredients { ingredients } => Some(ingredients_section(ingredients)),
        GenerationRequest::WithConstraints(constraints) => constraints_section(constraints),
    };

    let mut prompt = base_prompt(tier);
    if let Some(section) = section {
        prompt.push_str("\n\n");
        prompt.push_str(&section);
    }
    prompt.push_str("\n\n");
    prompt.push_str(JSON_ONLY_INSTRUCTION);
    prompt
}
