use lunardate::LunarDate;
use time::Date;

/// Source of lunar-calendar facts for a civil date.
///
/// Kept as a trait so the calendar grid can be exercised in tests without
/// dragging real conversion tables along.
pub(crate) trait Almanac {
    /// Lunar facts for `date`, or `None` when the date falls outside the
    /// range the conversion data covers.
    fn lunar_info(&self, date: Date) -> Option<LunarInfo>;
}

/// Labels for one lunar day, already rendered in Chinese.
#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct LunarInfo {
    /// Sexagenary year name, e.g. `丙午`.
    pub(crate) year_stem_branch: String,
    /// Zodiac animal of the lunar year, e.g. `马`.
    pub(crate) zodiac: &'static str,
    /// Month name with `月` suffix and `闰` prefix when intercalary.
    pub(crate) month_name: String,
    pub(crate) leap_month: bool,
    /// Day name in the traditional 初一..三十 series.
    pub(crate) day_name: &'static str,
    pub(crate) festival: Option<&'static str>,
}

impl LunarInfo {
    /// One-line almanac summary, e.g. `丙午马年正月初一`.
    pub(crate) fn summary(&self) -> String {
        format!(
            "{}{}年{}{}",
            self.year_stem_branch, self.zodiac, self.month_name, self.day_name
        )
    }
}

/// [`Almanac`] backed by the `lunardate` conversion tables.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub(crate) struct ChineseAlmanac;

impl Almanac for ChineseAlmanac {
    fn lunar_info(&self, date: Date) -> Option<LunarInfo> {
        let lunar = LunarDate::from_solar_date(
            date.year(),
            u32::from(u8::from(date.month())),
            u32::from(date.day()),
        )
        .ok()?;
        let month_idx = usize::try_from(lunar.month()).ok()?.checked_sub(1)?;
        let day_idx = usize::try_from(lunar.day()).ok()?.checked_sub(1)?;
        let month_stem = *MONTHS.get(month_idx)?;
        let day_name = *DAYS.get(day_idx)?;
        let leap = lunar.is_leap_month();
        Some(LunarInfo {
            year_stem_branch: stem_branch(lunar.year()),
            zodiac: zodiac_label(lunar.year()),
            month_name: format!("{}{month_stem}月", if leap { "闰" } else { "" }),
            leap_month: leap,
            day_name,
            festival: resolve_festival(None, month_idx + 1, day_idx + 1, leap),
        })
    }
}

/// Festival for a lunar month/day, preferring a name supplied by the
/// conversion source over the built-in table.  Intercalary months never
/// carry a festival.
pub(crate) fn resolve_festival(
    provided: Option<&'static str>,
    month: usize,
    day: usize,
    leap: bool,
) -> Option<&'static str> {
    if leap {
        return None;
    }
    provided.or_else(|| builtin_festival(month, day))
}

static STEMS: [&str; 10] = ["甲", "乙", "丙", "丁", "戊", "己", "庚", "辛", "壬", "癸"];

static BRANCHES: [&str; 12] = [
    "子", "丑", "寅", "卯", "辰", "巳", "午", "未", "申", "酉", "戌", "亥",
];

static ZODIAC: [&str; 12] = [
    "鼠", "牛", "虎", "兔", "龙", "蛇", "马", "羊", "猴", "鸡", "狗", "猪",
];

static MONTHS: [&str; 12] = [
    "正", "二", "三", "四", "五", "六", "七", "八", "九", "十", "冬", "腊",
];

static DAYS: [&str; 30] = [
    "初一", "初二", "初三", "初四", "初五", "初六", "初七", "初八", "初九", "初十", "十一",
    "十二", "十三", "十四", "十五", "十六", "十七", "十八", "十九", "二十", "廿一", "廿二",
    "廿三", "廿四", "廿五", "廿六", "廿七", "廿八", "廿九", "三十",
];

static FESTIVALS: [(usize, usize, &str); 10] = [
    (1, 1, "春节"),
    (1, 15, "元宵节"),
    (2, 2, "龙抬头"),
    (5, 5, "端午节"),
    (7, 7, "七夕节"),
    (8, 15, "中秋节"),
    (9, 9, "重阳节"),
    (12, 8, "腊八节"),
    (12, 23, "小年"),
    (12, 30, "除夕"),
];

// Year 4 CE opened a sexagenary cycle, so both series count from there.
fn cycle_index(year: i32, len: i32) -> usize {
    usize::try_from((year - 4).rem_euclid(len)).unwrap_or(0)
}

fn stem_branch(year: i32) -> String {
    format!("{}{}", STEMS[cycle_index(year, 10)], BRANCHES[cycle_index(year, 12)])
}

fn zodiac_label(year: i32) -> &'static str {
    ZODIAC[cycle_index(year, 12)]
}

fn builtin_festival(month: usize, day: usize) -> Option<&'static str> {
    FESTIVALS
        .iter()
        .find(|&&(m, d, _)| m == month && d == day)
        .map(|&(_, _, name)| name)
}
