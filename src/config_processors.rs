use justconfig::error::ConfigError;
use justconfig::item::{MapAction, StringItem};

/// Remove quotes from configuration strings.
pub trait Unquote
where
    Self: Sized,
{
    fn unquote(self) -> Result<StringItem, ConfigError>;
}

impl Unquote for Result<StringItem, ConfigError> {
    /// Trims each configuration value and strips one pair of surrounding
    /// double quotes if present. Unquoted values pass through unchanged.
    fn unquote(self) -> Result<StringItem, ConfigError> {
        self?.map(|v| {
            let v = v.trim();

            if v.starts_with('"') && v.ends_with('"') {
                MapAction::Replace(vec![v[1..v.len() - 1].to_owned()])
            } else {
                MapAction::Keep
            }
        })
    }
}

/// Expand comma separated configuration values into one value per element.
pub trait SplitList
where
    Self: Sized,
{
    fn split_list(self) -> Result<StringItem, ConfigError>;
}

impl SplitList for Result<StringItem, ConfigError> {
    /// Splits every configuration value on commas and trims the parts, so
    /// `categories = IPA, Stout, Lager` can be read with `values(1..)`.
    /// Empty parts are dropped.
    fn split_list(self) -> Result<StringItem, ConfigError> {
        self?.map(|v| {
            MapAction::Replace(
                v.split(',')
                    .map(|part| part.trim().to_owned())
                    .filter(|part| !part.is_empty())
                    .collect(),
            )
        })
    }
}

#[cfg(test)]
mod config_processors_test {
    use super::*;
    use justconfig::item::ValueExtractor;
    use justconfig::sources::defaults::Defaults;
    use justconfig::ConfPath;
    use justconfig::Config;

    #[test]
    fn should_strip_quotes() {
        let mut conf = Config::default();
        let mut defaults = Defaults::default();
        defaults.set(conf.root().push_all(&["quoted"]), "\"IPA\"", "test");
        conf.add_source(defaults);

        let value: String = conf
            .get(ConfPath::from(&["quoted"]))
            .unquote()
            .value()
            .unwrap();
        assert_eq!("IPA", value);
    }

    #[test]
    fn should_split_comma_separated_values() {
        let mut conf = Config::default();
        let mut defaults = Defaults::default();
        defaults.set(
            conf.root().push_all(&["categories"]),
            "IPA, Stout,Lager, ",
            "test",
        );
        conf.add_source(defaults);

        let values: Vec<String> = conf
            .get(ConfPath::from(&["categories"]))
            .split_list()
            .values(1..)
            .unwrap();
        assert_eq!(vec!["IPA", "Stout", "Lager"], values);
    }
}
