//! Canned content used when live sources or the text-generation API are unusable
//!
//! Nothing here touches the network. The bulk news path leans on
//! [`fallback_articles`] so that the dashboard never renders an empty grid.

use chrono::{DateTime, Utc};

use finterm_core::{build_cards, Article, ArticleSource, NewsCardItem, PRESET_SOURCE};

/// (title, description) pairs of the preset articles
const FALLBACK_NEWS: [(&str, &str); 9] = [
    (
        "全球股市震盪，投資者應如何應對？",
        "近期全球主要股市波動加劇，受地緣政治緊張和通脹預期影響。專家建議投資者保持謹慎，分散投資組合，並關注長期價值。",
    ),
    (
        "科技巨頭財報季來臨，市場屏息以待",
        "蘋果、微軟、谷歌等科技巨頭即將發布最新財報，其業績表現將對全球股市產生重大影響。分析師預計，AI 相關業務將是本次財報的亮點。",
    ),
    (
        "央行貨幣政策轉向，債市迎來新機遇",
        "隨著全球通脹壓力趨緩，多國央行釋放出貨幣政策可能轉向的信號。債券市場有望迎來配置良機，尤其是高評級債券。",
    ),
    (
        "原油價格波動加劇，能源板塊投資風險與機遇並存",
        "地緣政治緊張局勢和全球經濟前景不明朗導致原油價格劇烈波動。投資者需密切關注供應鏈變化和OPEC+的決策。",
    ),
    (
        "新興市場吸引力提升，但匯率風險不容忽視",
        "在全球經濟復甦不均衡的背景下，部分新興市場展現出較強的增長潛力。然而，匯率波動和資本外流風險仍是投資者需要警惕的因素。",
    ),
    (
        "黃金避險需求升溫，貴金屬配置價值凸顯",
        "在不確定性增加的市場環境中，黃金作為傳統避險資產的吸引力再次提升。投資者可適當配置貴金屬以對沖風險。",
    ),
    (
        "AI 技術加速金融業變革，智能投顧成新趨勢",
        "人工智能技術正深刻改變金融服務業，智能投顧、量化交易等新模式不斷湧現，為投資者提供更個性化、高效的服務。",
    ),
    (
        "全球供應鏈重塑，製造業板塊面臨挑戰與機遇",
        "地緣政治和貿易摩擦加速全球供應鏈多元化布局，部分製造業企業面臨成本上升壓力，但也為具備彈性和創新能力的企業帶來新機遇。",
    ),
    (
        "數字貨幣監管趨嚴，區塊鏈技術應用前景廣闊",
        "隨著各國對數字貨幣監管政策的逐步完善，區塊鏈技術在金融、供應鏈等領域的應用前景日益廣闊，但投資仍需謹慎。",
    ),
];

/// (title, summary, insight, category) of the cards the dashboard shows when
/// the news API cannot be reached at all
const LOCAL_NEWS: [(&str, &str, &str, &str); 9] = [
    (
        "AI 全球財經終端：歡迎體驗",
        "當前新聞服務暫時不可用，或網絡連接不穩定。請稍後重試。系統已為您加載預置新聞，確保頁面正常顯示。",
        "💡 提示：請檢查網絡連接或後端服務狀態。",
        "系統提示",
    ),
    (
        "全球經濟展望：挑戰與機遇並存",
        "分析師指出，儘管全球經濟面臨多重挑戰，但新興技術和綠色產業帶來新的增長機遇。",
        "💡 投資者應關注科技創新和可持續發展領域的投資機會。",
        "宏觀經濟",
    ),
    (
        "科技股領漲市場，AI 概念持續火熱",
        "人工智能相關股票表現強勁，帶動科技板塊整體上漲。市場對 AI 技術的未來發展充滿期待。",
        "💡 AI 領域的長期投資價值顯著，但需警惕短期波動風險。",
        "市場分析",
    ),
    (
        "央行貨幣政策會議紀要：謹慎觀望",
        "最新央行會議紀要顯示，決策者對通脹前景仍持謹慎態度，未來貨幣政策走向仍不明朗。",
        "💡 貨幣政策的不確定性可能增加市場波動，建議投資者保持流動性。",
        "政策解讀",
    ),
    (
        "原油價格波動加劇，能源板塊受關注",
        "地緣政治緊張局勢和供應鏈問題導致原油價格大幅波動，能源類股票成為市場焦點。",
        "💡 能源板塊短期內受地緣政治影響大，長期投資需綜合考慮供需關係。",
        "大宗商品",
    ),
    (
        "黃金避險需求上升，貴金屬表現堅挺",
        "在全球經濟不確定性增加的背景下，黃金作為避險資產的吸引力增強，價格持續走高。",
        "💡 適當配置黃金有助於對沖市場風險，尤其是在波動時期。",
        "貴金屬",
    ),
    (
        "新興市場投資機會：高增長與高風險並存",
        "部分新興市場經濟體展現出強勁增長勢頭，吸引國際資本流入，但同時也伴隨著較高的政治和匯率風險。",
        "💡 投資新興市場需仔細評估各國宏觀經濟狀況和政策穩定性。",
        "新興市場",
    ),
    (
        "區塊鏈技術應用加速，數字資產未來可期",
        "區塊鏈技術在金融、供應鏈等領域的應用不斷深化，數字資產的發展前景廣闊，但監管政策仍是關鍵變數。",
        "💡 區塊鏈技術的長期潛力巨大，但數字資產投資波動性高，需謹慎。",
        "區塊鏈",
    ),
    (
        "ESG 投資理念盛行，可持續發展成主流",
        "環境、社會和公司治理（ESG）投資理念日益受到重視，越來越多的投資者將可持續發展納入決策考量。",
        "💡 ESG 投資不僅符合社會責任，長期來看也可能帶來穩定的財務回報。",
        "ESG投資",
    ),
];

/// Built-in glossary. Takes precedence over any cached or generated definition.
const POPULAR_TERMS: [(&str, &str); 10] = [
    ("縮表", "央行減少資產負債表規模，通常通過不再購買新的資產或讓現有資產到期而不再購買來實現。這是一種緊縮貨幣政策工具。"),
    ("非農", "美國非農就業人數，是衡量美國就業市場健康狀況的重要經濟指標。每月首週五發布，對美元和股市影響重大。"),
    ("降息", "央行降低基準利率，使借貸成本下降，促進經濟增長。通常在經濟衰退或通脹下降時進行。"),
    ("升息", "央行提高基準利率，使借貸成本上升，抑制通脹。通常在經濟過熱或通脹上升時進行。"),
    ("QE", "量化寬鬆政策，央行通過購買長期資產來增加貨幣供應量，降低長期利率。"),
    ("CPI", "消費者物價指數，衡量消費者購買商品和服務的平均價格變化，是衡量通脹的重要指標。"),
    ("GDP", "國內生產總值，衡量一個國家在特定時期內生產的所有商品和服務的總價值。"),
    ("熊市", "股票市場持續下跌的時期，投資者信心低落，通常下跌 20% 以上。"),
    ("牛市", "股票市場持續上升的時期，投資者信心高漲，通常上升 20% 以上。"),
    ("回購", "公司用現金買回自己的股票，減少流通股數，通常用於提高每股收益或穩定股價。"),
];

/// Preset articles, stamped with `now` so relative time labels read "just now"
pub fn fallback_articles(now: DateTime<Utc>) -> Vec<Article> {
    let published_at = now.to_rfc3339();
    FALLBACK_NEWS
        .iter()
        .map(|(title, description)| Article {
            title: title.to_string(),
            description: description.to_string(),
            url: "#".to_string(),
            published_at: published_at.clone(),
            source: ArticleSource::new(PRESET_SOURCE),
            url_to_image: None,
        })
        .collect()
}

/// Preset articles already laid out as the nine dashboard cards
pub fn fallback_cards(now: DateTime<Utc>) -> Vec<NewsCardItem> {
    build_cards(&fallback_articles(now), now)
}

/// Finished cards for a client that cannot reach the news API. None of them
/// is pending, so nothing sends them back for enrichment.
pub fn local_fallback_cards() -> Vec<NewsCardItem> {
    LOCAL_NEWS
        .iter()
        .enumerate()
        .map(|(i, (title, summary, insight, category))| NewsCardItem {
            id: i + 1,
            title: title.to_string(),
            source: PRESET_SOURCE.to_string(),
            time: if i == 0 {
                "剛剛".to_string()
            } else {
                format!("{}小時前", i)
            },
            summary: summary.to_string(),
            ai_insight: insight.to_string(),
            category: Some(category.to_string()),
            url: "#".to_string(),
            image: None,
            original_title: title.to_string(),
        })
        .collect()
}

/// Definition from the built-in glossary, if the term is in it
pub fn static_term_definition(term: &str) -> Option<&'static str> {
    let term = term.trim();
    POPULAR_TERMS
        .iter()
        .find(|(key, _)| *key == term)
        .map(|(_, definition)| *definition)
}

#[cfg(test)]
mod tests {
    use super::*;
    use finterm_core::NEWS_CARD_COUNT;

    #[test]
    fn test_fallback_articles_are_fresh() {
        let now = Utc::now();
        let articles = fallback_articles(now);
        assert!(articles.len() >= NEWS_CARD_COUNT);
        assert!(articles.iter().all(|a| a.source.name == PRESET_SOURCE));
        assert!(articles.iter().all(|a| a.published_at == now.to_rfc3339()));
    }

    #[test]
    fn test_fallback_cards_fill_grid() {
        let cards = fallback_cards(Utc::now());
        assert_eq!(cards.len(), NEWS_CARD_COUNT);
        assert!(cards.iter().all(|c| c.time == "剛剛"));
        assert!(!cards.iter().any(|c| c.title.starts_with("Placeholder")));
    }

    #[test]
    fn test_local_fallback_cards_are_finished() {
        let cards = local_fallback_cards();
        assert_eq!(cards.len(), NEWS_CARD_COUNT);
        assert!(cards.iter().all(|c| !c.is_pending()));
        assert!(cards.iter().all(|c| c.category.is_some()));
        assert_eq!(cards[0].time, "剛剛");
        assert_eq!(cards[8].id, 9);
        assert_eq!(cards[8].time, "8小時前");
    }

    #[test]
    fn test_static_terms() {
        assert!(static_term_definition("CPI").unwrap().contains("消費者物價指數"));
        assert!(static_term_definition(" 縮表 ").is_some());
        assert!(static_term_definition("cpi").is_none());
        assert!(static_term_definition("期權").is_none());
    }
}
