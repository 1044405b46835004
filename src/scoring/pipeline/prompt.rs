use crate::scoring::domain::{Lead, Offer};

/// Render the classification prompt for one offer/lead pair. The model is
/// asked for strict JSON so the verdict parser can decode it directly.
pub fn build_classification_prompt(offer: &Offer, lead: &Lead) -> String {
    format!(
        r#"You are a sales assistant. Given the product details and lead profile,
classify the lead's buying intent as High, Medium, or Low and explain why in 1-2 sentences.

Offer:
Name: {offer_name}
Value Props: {offer_props}
Ideal Use Cases: {offer_uses}

Lead:
Name: {lead_name}
Role: {lead_role}
Company: {lead_company}
Industry: {lead_industry}
Location: {lead_location}
Bio: {lead_bio}

Respond ONLY in JSON format:
{{
  "intent": "High" | "Medium" | "Low",
  "reasoning": "short explanation"
}}"#,
        offer_name = offer.name,
        offer_props = offer.value_props.join(", "),
        offer_uses = offer.ideal_use_cases.join(", "),
        lead_name = lead.name,
        lead_role = lead.role,
        lead_company = lead.company,
        lead_industry = lead.industry,
        lead_location = lead.location,
        lead_bio = lead.linkedin_bio,
    )
}
