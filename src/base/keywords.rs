//! Built-in keyword replies.

/// Default trigger table, in match order.
pub const DEFAULT_KEYWORDS: &[(&str, &str)] = &[
    ("傻逼", "谢谢夸奖"),
    ("性别", "盲猜我的性别是武装直升机"),
    ("干嘛", "how"),
    ("谢谢", "qaq"),
    ("qaq", "qwq"),
    ("你是谁", "猜猜我是谁"),
    ("愚蠢", "yes，我只会关键词匹配"),
    ("丁真", "妈妈生的"),
];

/// Reply used when no trigger matches.
pub const DEFAULT_FALLBACK: &str = "你干嘛";
