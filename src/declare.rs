use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// 報價數據的來源性質。
///
/// 抓取失敗時會以模擬值代替，模擬值必須跟著資料一路寫進 price_logs，
/// 下游才分得出真假報價。
#[derive(Debug, Copy, Clone, PartialEq, Eq, Display, AsRefStr, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum QuoteProvenance {
    /// 來自遠端報價來源的真實數據
    Real,
    /// 抓取失敗後以亂數產生的替代數據
    Simulated,
}

/// 警示的優先等級
#[derive(Debug, Copy, Clone, PartialEq, Eq, Display, AsRefStr, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum AlertSeverity {
    Info,
    Warning,
    Critical,
}

impl AlertSeverity {
    /// 排序用的權重，數字越大越優先
    pub fn rank(&self) -> i32 {
        match self {
            AlertSeverity::Critical => 3,
            AlertSeverity::Warning => 2,
            AlertSeverity::Info => 1,
        }
    }
}

/// 警示的類型
#[derive(Debug, Copy, Clone, PartialEq, Eq, Display, AsRefStr, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    PriceSurge,
    PriceDrop,
    HighYield,
    VolumeSpike,
    NewsFlash,
    Dividend,
}

/// 估值結論
#[derive(Debug, Copy, Clone, PartialEq, Eq, Display, AsRefStr, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ValuationStatus {
    /// 極度便宜（分數 >= 90）
    ExtremeCheap,
    /// 低估（分數 >= 80）
    Undervalued,
    /// 合理
    Fair,
    /// 高估（分數 <= 40）
    Overvalued,
}

/// SETHD 成分股的產業分類
#[derive(PartialEq, Eq, Debug, Copy, Clone)]
pub enum Sector {
    Energy,
    Banking,
    Ict,
    Property,
    Construction,
    Food,
    Commerce,
    HealthCare,
    Transport,
}

impl Sector {
    pub fn name(&self) -> &'static str {
        match self {
            Sector::Energy => "Energy",
            Sector::Banking => "Banking",
            Sector::Ict => "ICT",
            Sector::Property => "Property",
            Sector::Construction => "Construction",
            Sector::Food => "Food",
            Sector::Commerce => "Commerce",
            Sector::HealthCare => "Health Care",
            Sector::Transport => "Transport",
        }
    }
}

/// 目前的股票報價含漲跌、漲幅
#[derive(Debug, Clone, PartialEq)]
pub struct StockQuotes {
    pub stock_symbol: String,
    pub price: f64,
    pub change: f64,
    pub change_percent: f64,
}

/// 走勢圖上的一個取樣點。
///
/// price 為 None 時代表午休缺口的占位點，畫線時留白不內插。
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChartPoint {
    /// Unix 時間戳（秒）
    pub time: i64,
    pub price: Option<f64>,
}

/// SETHD 30 成分股
#[derive(Debug, Copy, Clone)]
pub struct Constituent {
    pub stock_symbol: &'static str,
    pub name: &'static str,
    pub sector: Sector,
}

/// 追蹤的成分股清單。
///
/// 整個程式只有這一份清單，排程、抓取與儀表板都吃同一來源，
/// 不再像舊版散落在多個腳本各自為政。
pub const SETHD30: [Constituent; 30] = [
    Constituent { stock_symbol: "PTT", name: "PTT Public Company", sector: Sector::Energy },
    Constituent { stock_symbol: "PTTEP", name: "PTT Exploration & Prod", sector: Sector::Energy },
    Constituent { stock_symbol: "TOP", name: "Thai Oil", sector: Sector::Energy },
    Constituent { stock_symbol: "BCP", name: "Bangchak Corp", sector: Sector::Energy },
    Constituent { stock_symbol: "EGCO", name: "Electricity Generating", sector: Sector::Energy },
    Constituent { stock_symbol: "RATCH", name: "Ratch Group", sector: Sector::Energy },
    Constituent { stock_symbol: "BANPU", name: "Banpu", sector: Sector::Energy },
    Constituent { stock_symbol: "SCB", name: "SCB X", sector: Sector::Banking },
    Constituent { stock_symbol: "KBANK", name: "Kasikornbank", sector: Sector::Banking },
    Constituent { stock_symbol: "BBL", name: "Bangkok Bank", sector: Sector::Banking },
    Constituent { stock_symbol: "KTB", name: "Krung Thai Bank", sector: Sector::Banking },
    Constituent { stock_symbol: "TTB", name: "TMBThanachart Bank", sector: Sector::Banking },
    Constituent { stock_symbol: "TISCO", name: "Tisco Financial", sector: Sector::Banking },
    Constituent { stock_symbol: "KKP", name: "Kiatnakin Phatra", sector: Sector::Banking },
    Constituent { stock_symbol: "ADVANC", name: "Advanced Info Service", sector: Sector::Ict },
    Constituent { stock_symbol: "INTUCH", name: "Intouch Holdings", sector: Sector::Ict },
    Constituent { stock_symbol: "LH", name: "Land and Houses", sector: Sector::Property },
    Constituent { stock_symbol: "SIRI", name: "Sansiri", sector: Sector::Property },
    Constituent { stock_symbol: "SPALI", name: "Supalai", sector: Sector::Property },
    Constituent { stock_symbol: "AP", name: "AP (Thailand)", sector: Sector::Property },
    Constituent { stock_symbol: "ORI", name: "Origin Property", sector: Sector::Property },
    Constituent { stock_symbol: "WHA", name: "WHA Corp", sector: Sector::Property },
    Constituent { stock_symbol: "SCC", name: "Siam Cement", sector: Sector::Construction },
    Constituent { stock_symbol: "TASCO", name: "Tipco Asphalt", sector: Sector::Construction },
    Constituent { stock_symbol: "TU", name: "Thai Union Group", sector: Sector::Food },
    Constituent { stock_symbol: "TVO", name: "Thai Vegetable Oil", sector: Sector::Food },
    Constituent { stock_symbol: "HMPRO", name: "Home Product Center", sector: Sector::Commerce },
    Constituent { stock_symbol: "COM7", name: "Com7", sector: Sector::Commerce },
    Constituent { stock_symbol: "BDMS", name: "Bangkok Dusit Med", sector: Sector::HealthCare },
    Constituent { stock_symbol: "BEM", name: "Bangkok Expressway", sector: Sector::Transport },
];
