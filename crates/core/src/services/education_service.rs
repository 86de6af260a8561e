use crate::models::education::{Difficulty, EducationalTopic, GlossaryTerm, TopicCategory};

const fn topic(
    id: &'static str,
    title: &'static str,
    category: TopicCategory,
    difficulty: Difficulty,
    description: &'static str,
) -> EducationalTopic {
    EducationalTopic {
        id,
        title,
        category,
        difficulty,
        description,
    }
}

const fn term(term: &'static str, definition: &'static str) -> GlossaryTerm {
    GlossaryTerm { term, definition }
}

static TOPICS: [EducationalTopic; 10] = [
    topic("blockchain-basics", "What is Blockchain?", TopicCategory::Basics, Difficulty::Beginner,
        "Learn the fundamental concepts of blockchain technology"),
    topic("bitcoin-intro", "Introduction to Bitcoin", TopicCategory::Basics, Difficulty::Beginner,
        "Understanding the first cryptocurrency and how it works"),
    topic("ethereum-intro", "Introduction to Ethereum", TopicCategory::Basics, Difficulty::Beginner,
        "Learn about Ethereum and smart contracts"),
    topic("defi-explained", "What is DeFi?", TopicCategory::Defi, Difficulty::Intermediate,
        "Decentralized Finance and its applications"),
    topic("yield-farming", "Yield Farming & Liquidity Mining", TopicCategory::Defi, Difficulty::Advanced,
        "Advanced DeFi strategies for earning returns"),
    topic("nft-basics", "Understanding NFTs", TopicCategory::Nft, Difficulty::Beginner,
        "Non-Fungible Tokens and digital ownership"),
    topic("trading-basics", "Crypto Trading Fundamentals", TopicCategory::Trading, Difficulty::Beginner,
        "Basic concepts of cryptocurrency trading"),
    topic("technical-analysis", "Technical Analysis", TopicCategory::Trading, Difficulty::Intermediate,
        "Reading charts and identifying patterns"),
    topic("wallet-security", "Wallet Security Best Practices", TopicCategory::Security, Difficulty::Beginner,
        "How to keep your crypto assets safe"),
    topic("private-keys", "Private Keys & Seed Phrases", TopicCategory::Security, Difficulty::Intermediate,
        "Understanding cryptographic security"),
];

static GLOSSARY: [GlossaryTerm; 15] = [
    term("HODL", "Hold On for Dear Life - a strategy of holding crypto long-term despite volatility"),
    term("FOMO", "Fear Of Missing Out - anxiety about missing potential gains"),
    term("FUD", "Fear, Uncertainty, and Doubt - negative information spread to influence prices"),
    term("Altcoin", "Any cryptocurrency other than Bitcoin"),
    term("Market Cap", "Total value of a cryptocurrency (price × circulating supply)"),
    term("Whale", "An individual or entity holding large amounts of cryptocurrency"),
    term("Gas Fees", "Transaction fees paid on blockchain networks like Ethereum"),
    term("Staking", "Locking up crypto to support network operations and earn rewards"),
    term("Mining", "Process of validating transactions and creating new coins"),
    term("Smart Contract", "Self-executing contracts with terms written in code"),
    term("DEX", "Decentralized Exchange - peer-to-peer trading without intermediaries"),
    term("CEX", "Centralized Exchange - traditional crypto exchange with central authority"),
    term("Cold Wallet", "Offline storage for cryptocurrencies (hardware wallet)"),
    term("Hot Wallet", "Online wallet connected to the internet"),
    term("Airdrop", "Free distribution of tokens to wallet addresses"),
];

/// Filters over the educational catalog. `None` matches everything.
#[derive(Debug, Clone, Default)]
pub struct TopicFilter {
    pub category: Option<TopicCategory>,
    pub difficulty: Option<Difficulty>,
    /// Case-insensitive substring of title or description
    pub query: Option<String>,
}

/// Static catalog of lessons and glossary terms.
pub struct EducationService;

impl EducationService {
    pub fn topics() -> &'static [EducationalTopic] {
        &TOPICS
    }

    pub fn glossary() -> &'static [GlossaryTerm] {
        &GLOSSARY
    }

    pub fn find_topic(id: &str) -> Option<&'static EducationalTopic> {
        TOPICS.iter().find(|t| t.id == id)
    }

    pub fn filter_topics(filter: &TopicFilter) -> Vec<&'static EducationalTopic> {
        let query = filter.query.as_deref().map(str::to_lowercase);
        TOPICS
            .iter()
            .filter(|t| filter.category.is_none_or(|c| t.category == c))
            .filter(|t| filter.difficulty.is_none_or(|d| t.difficulty == d))
            .filter(|t| {
                query.as_deref().is_none_or(|q| {
                    t.title.to_lowercase().contains(q) || t.description.to_lowercase().contains(q)
                })
            })
            .collect()
    }

    pub fn search_glossary(query: &str) -> Vec<&'static GlossaryTerm> {
        let q = query.to_lowercase();
        GLOSSARY
            .iter()
            .filter(|g| g.term.to_lowercase().contains(&q) || g.definition.to_lowercase().contains(&q))
            .collect()
    }

    /// Prompt that asks the model for the lesson body of `topic`.
    pub fn topic_prompt(topic: &EducationalTopic) -> String {
        format!(
            "Explain the cryptocurrency concept \"{}\" at a {} level. Keep it educational, clear, and concise (3-4 paragraphs). Include practical examples where relevant.",
            topic.title, topic.difficulty
        )
    }
}
