//! Clinic facts that shape every assistant exchange.
//!
//! The preamble sent with each user question, the greeting, the fallback
//! reply and the quick prompts are all rendered from one [`ClinicProfile`]
//! so they stay consistent and can be swapped in tests.

use once_cell::sync::Lazy;
use std::fmt;

/// How many quick prompts are offered before the first exchange.
pub const VISIBLE_QUICK_PROMPTS: usize = 3;

static SAME_DAY_DENTAL: Lazy<ClinicProfile> = Lazy::new(|| ClinicProfile {
    name: "Same Day Dental".to_string(),
    phone: "(317) 854-5309".to_string(),
    street: "7225 US-31".to_string(),
    city: "Indianapolis".to_string(),
    state: "IN".to_string(),
    rating_tenths: 41,
    review_count: 2742,
    specialties: "emergency dental care, same-day appointments".to_string(),
    services: vec![
        ServiceOffering::new("Emergency Care", 89),
        ServiceOffering::new("General Dentistry", 149),
        ServiceOffering::new("Cosmetic Dentistry", 299),
        ServiceOffering::new("Restorative Care", 599),
        ServiceOffering::new("Family Dentistry", 99),
        ServiceOffering::new("Oral Surgery", 199),
    ],
    guidelines: vec![
        "Always be helpful, professional, and empathetic".to_string(),
        "For appointments, encourage them to call or use online booking".to_string(),
        "Provide general dental education but never diagnose conditions".to_string(),
        "If unsure about medical advice, recommend seeing a dentist".to_string(),
        "Keep responses concise but informative".to_string(),
        "Use emojis sparingly and appropriately".to_string(),
    ],
    help_topics: vec![
        "🦷 Dental questions & advice".to_string(),
        "📅 Scheduling appointments".to_string(),
        "🚨 Emergency care information".to_string(),
        "💰 Treatment costs & insurance".to_string(),
    ],
    quick_prompts: vec![
        "Do you take my insurance?".to_string(),
        "What are your emergency hours?".to_string(),
        "How much does teeth whitening cost?".to_string(),
        "I have severe tooth pain, what should I do?".to_string(),
        "Can I get same-day appointment?".to_string(),
        "What services do you offer?".to_string(),
    ],
});

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServiceOffering {
    pub name: String,
    /// Lowest advertised price in whole US dollars.
    pub starting_price_usd: u32,
}

impl ServiceOffering {
    pub fn new(name: impl Into<String>, starting_price_usd: u32) -> Self {
        Self {
            name: name.into(),
            starting_price_usd,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClinicProfile {
    pub name: String,
    /// Contact number used for emergencies and in the fallback reply.
    pub phone: String,
    pub street: String,
    pub city: String,
    pub state: String,
    /// Star rating times ten, so 4.1 stars is `41`.
    pub rating_tenths: u16,
    pub review_count: u32,
    pub specialties: String,
    pub services: Vec<ServiceOffering>,
    /// Behavior rules for the model. The emergency rule is derived from
    /// `phone` and always rendered second.
    pub guidelines: Vec<String>,
    pub help_topics: Vec<String>,
    pub quick_prompts: Vec<String>,
}

impl Default for ClinicProfile {
    fn default() -> Self {
        SAME_DAY_DENTAL.clone()
    }
}

impl ClinicProfile {
    pub fn address(&self) -> String {
        format!("{}, {}, {}", self.street, self.city, self.state)
    }

    pub fn emergency_guideline(&self) -> String {
        format!(
            "For medical emergencies, direct them to call {} immediately",
            self.phone
        )
    }

    /// Fixed instructional text placed ahead of every user question.
    pub fn preamble(&self) -> String {
        Preamble(self).to_string()
    }

    /// Complete completion prompt: preamble followed by the user's question.
    pub fn render_prompt(&self, user_text: &str) -> String {
        format!(
            "{}\nUser question: \"{}\"\n\nRespond as the {} AI assistant:",
            self.preamble(),
            user_text,
            self.name
        )
    }

    pub fn greeting(&self) -> String {
        format!(
            "Hi! I'm your {} assistant. I can help you with:\n\n{}\n\nHow can I help you today?",
            self.name,
            self.help_topics.join("\n")
        )
    }

    /// Reply used whenever the completion endpoint cannot answer.
    pub fn fallback_reply(&self) -> String {
        format!(
            "I'm having trouble connecting right now. For immediate assistance, please call us at {}. Our team is always ready to help! 📞",
            self.phone
        )
    }

    pub fn disclaimer(&self) -> String {
        format!("Powered by AI • For emergencies call {}", self.phone)
    }
}

struct Preamble<'a>(&'a ClinicProfile);

impl fmt::Display for Preamble<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let clinic = self.0;
        writeln!(
            f,
            "You are an AI assistant for {} clinic located at {}, {}.",
            clinic.name, clinic.street, clinic.city
        )?;
        writeln!(f)?;

        writeln!(f, "CLINIC INFO:")?;
        writeln!(f, "- Name: {}", clinic.name)?;
        writeln!(f, "- Phone: {}", clinic.phone)?;
        writeln!(f, "- Address: {}", clinic.address())?;
        writeln!(
            f,
            "- Rating: {}.{} stars with {} Google reviews",
            clinic.rating_tenths / 10,
            clinic.rating_tenths % 10,
            group_thousands(clinic.review_count)
        )?;
        writeln!(f, "- Specializes in {}", clinic.specialties)?;
        let services = clinic
            .services
            .iter()
            .map(|service| service.name.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        writeln!(f, "- Services: {services}")?;
        writeln!(f)?;

        writeln!(f, "IMPORTANT GUIDELINES:")?;
        let emergency = clinic.emergency_guideline();
        let mut rules: Vec<&str> = clinic.guidelines.iter().map(String::as_str).collect();
        rules.insert(rules.len().min(1), &emergency);
        for rule in rules {
            writeln!(f, "- {rule}")?;
        }
        writeln!(f)?;

        writeln!(f, "SERVICES & PRICING:")?;
        for service in &clinic.services {
            writeln!(f, "- {}: From ${}", service.name, service.starting_price_usd)?;
        }
        Ok(())
    }
}

fn group_thousands(value: u32) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
