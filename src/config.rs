use clap::ValueEnum;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Intent {
    Informational,
    Transactional,
    Listicle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Audience {
    Beginners,
    Experts,
    Business,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Length {
    Short,
    Standard,
    Long,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Language {
    English,
    Spanish,
    French,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Tone {
    Professional,
    Casual,
    Enthusiastic,
    Witty,
    Authoritative,
    Empathetic,
}

impl Intent {
    fn as_str(self) -> &'static str {
        match self {
            Intent::Informational => "informational",
            Intent::Transactional => "transactional",
            Intent::Listicle => "listicle",
        }
    }
}

impl Audience {
    fn as_str(self) -> &'static str {
        match self {
            Audience::Beginners => "beginners",
            Audience::Experts => "industry experts",
            Audience::Business => "business owners",
        }
    }
}

impl Length {
    fn as_str(self) -> &'static str {
        match self {
            Length::Short => "short",
            Length::Standard => "standard",
            Length::Long => "long",
        }
    }

    fn word_target(self) -> &'static str {
        match self {
            Length::Short => "around 600-800 words, concise",
            Length::Standard => "around 1200-1500 words, depth",
            Length::Long => "over 2500 words, exhaustive",
        }
    }
}

impl Language {
    fn as_str(self) -> &'static str {
        match self {
            Language::English => "English",
            Language::Spanish => "Spanish",
            Language::French => "French",
        }
    }
}

impl Tone {
    fn as_str(self) -> &'static str {
        match self {
            Tone::Professional => "professional",
            Tone::Casual => "casual",
            Tone::Enthusiastic => "enthusiastic",
            Tone::Witty => "witty",
            Tone::Authoritative => "authoritative",
            Tone::Empathetic => "empathetic",
        }
    }
}

/// Immutable per-generation request record. The pipeline never interprets
/// these fields; they only shape the prompt sent upstream.
#[derive(Debug, Clone)]
pub struct ArticleConfig {
    pub keyword: String,
    pub secondary_keywords: String,
    pub intent: Intent,
    pub audience: Audience,
    pub length: Length,
    pub language: Language,
    pub tone: Tone,
    pub clickbait: bool,
    pub include_images: bool,
    pub include_faq: bool,
}

impl ArticleConfig {
    /// Readability and formatting rules for the model. The formatting rules
    /// are what the normalizer leans on: HTML-only, fixed tag vocabulary,
    /// <h1> first, hidden meta-description div second.
    pub fn system_instruction(&self) -> String {
        let title_rule = if self.clickbait {
            "The H1 Title MUST be highly clickbait, using power words (e.g. 'Shocking', 'Ultimate', 'Insane'), and psychologically compelling the user to click."
        } else {
            "The H1 Title MUST be SEO-optimized, clear, and professional."
        };

        format!(
            "You are an expert copywriter who specializes in HIGH READABILITY content.\n\
             Your goal is to write content that flows like water, keeping the reader glued to the screen.\n\
             \n\
             CRITICAL READABILITY RULES:\n\
             1. Short sentences: keep sentences under 20 words where possible.\n\
             2. Short paragraphs: strict limit of 3-4 sentences per paragraph.\n\
             3. Simple vocabulary: write at an 8th-grade reading level.\n\
             4. Active voice: say \"You can do X\", not \"X can be done\".\n\
             5. Transitional phrases: connect ideas smoothly (\"Here's the deal:\", \"However,\", \"Consequently,\").\n\
             \n\
             CRITICAL FORMATTING RULES:\n\
             1. Output ONLY raw HTML. No ``` code blocks.\n\
             2. STRICTLY NO MARKDOWN. No **bold**, no *italics*, no ## headers.\n\
             3. Use ONLY: <h1>, <h2>, <h3>, <p>, <ul>, <ol>, <li>, <strong>, <em>, <blockquote>.\n\
             4. ALWAYS use the <strong> tag for bold text. NEVER use **text**.\n\
             5. Lists must be HTML: <ul><li>...</li></ul>. Never hyphens or asterisks.\n\
             6. The first element MUST be an <h1> tag. {}\n\
             7. The second element MUST be a hidden <div> with id=\"meta-description\" containing the meta description.\n\
             \n\
             Tone: {}. Language: {}.",
            title_rule,
            self.tone.as_str(),
            self.language.as_str(),
        )
    }

    pub fn user_prompt(&self) -> String {
        let mut prompt = format!(
            "Write a {} article ({}) about \"{}\".\n\n\
             Intent: {}. Target audience: {}.\n\n\
             Structure:\n\
             1. H1 title ({}).\n\
             2. Hidden meta description div.\n\
             3. Introduction: start with a hook, address the reader's pain point immediately.\n\
             4. Body: use H2s and H3s, break up text with <ul> bullet points frequently.\n\
             5. Conclusion.\n",
            self.length.as_str(),
            self.length.word_target(),
            self.keyword,
            self.intent.as_str(),
            self.audience.as_str(),
            if self.clickbait { "clickbait, high-CTR" } else { "standard SEO" },
        );

        if !self.secondary_keywords.trim().is_empty() {
            prompt.push_str(&format!(
                "\nWeave in these secondary keywords naturally: {}.\n",
                self.secondary_keywords.trim()
            ));
        }
        if self.include_images {
            prompt.push_str(
                "\nAfter each major H2 section, insert an image idea as exactly:\n\
                 <div class=\"image-placeholder\" data-prompt=\"DESCRIPTION OF THE VISUAL\">Visual idea</div>\n",
            );
        }
        if self.include_faq {
            prompt.push_str(
                "\nEnd with an <h2>FAQ</h2> section: 3-5 common questions as <h3>, each with a short <p> answer.\n",
            );
        }

        prompt.push_str(&format!(
            "\nEnsure the content is optimized for the keyword \"{}\".\n\
             IMPORTANT: Do NOT output Markdown. Use HTML tags only. Use <strong> for bold. Use <ul><li> for lists.",
            self.keyword
        ));
        prompt
    }
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> ArticleConfig {
        ArticleConfig {
            keyword: "SaaS marketing".into(),
            secondary_keywords: String::new(),
            intent: Intent::Informational,
            audience: Audience::Beginners,
            length: Length::Standard,
            language: Language::English,
            tone: Tone::Professional,
            clickbait: false,
            include_images: true,
            include_faq: false,
        }
    }

    #[test]
    fn system_instruction_mentions_tone_and_language() {
        let s = base().system_instruction();
        assert!(s.contains("Tone: professional"));
        assert!(s.contains("Language: English"));
        assert!(s.contains("meta-description"));
    }

    #[test]
    fn clickbait_switches_title_rule() {
        let plain = base().system_instruction();
        assert!(plain.contains("SEO-optimized"));
        let mut cfg = base();
        cfg.clickbait = true;
        assert!(cfg.system_instruction().contains("clickbait"));
    }

    #[test]
    fn prompt_carries_keyword_and_placeholder_format() {
        let p = base().user_prompt();
        assert!(p.contains("SaaS marketing"));
        assert!(p.contains("image-placeholder"));
        assert!(p.contains("data-prompt"));
    }

    #[test]
    fn optional_sections_respected() {
        let mut cfg = base();
        cfg.include_images = false;
        cfg.include_faq = true;
        cfg.secondary_keywords = "B2B growth, lead gen".into();
        let p = cfg.user_prompt();
        assert!(!p.contains("image-placeholder"));
        assert!(p.contains("FAQ"));
        assert!(p.contains("B2B growth"));
    }
}
