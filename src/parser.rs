use crate::models::{NewShift, Priority, ShiftType};

cached_regex!(priority_re, r"(?i)!(alta|media|baja|high|medium|low)\b\s*");
cached_regex!(marker_re, r"@(\S+)\s*");
cached_regex!(hours_re, r"~(\d+(?:\.\d+)?)h?\b\s*");
cached_regex!(
    shift_type_re,
    r"(?i)!(matutino|vespertino|nocturno|completo|morning|afternoon|night|full)\b\s*"
);
cached_regex!(time_range_re, r"\b(\d{1,2}:\d{2})-(\d{1,2}:\d{2})\b\s*");
cached_regex!(
    day_re,
    r"(?i)\b(domingo|lunes|martes|mi[eé]rcoles|jueves|viernes|s[aá]bado)\b\s*"
);
cached_regex!(spaces_re, r"\s+");

fn collapse(text: &str) -> String {
    spaces_re().replace_all(text, " ").trim().to_string()
}

#[derive(Debug, PartialEq)]
pub struct ParsedTask {
    pub title: String,
    pub priority: Option<Priority>,
    pub company: Option<String>,
    pub hours: Option<f64>,
}

pub fn parse_task_input(input: &str) -> ParsedTask {
    // Priority
    let priority = priority_re()
        .captures(input)
        .and_then(|caps| Priority::from_keyword(&caps[1]));

    // Company, underscores stand in for spaces
    let company = marker_re()
        .captures(input)
        .map(|caps| caps[1].replace('_', " "));

    // Estimated hours
    let hours = hours_re()
        .captures(input)
        .and_then(|caps| caps[1].parse::<f64>().ok());

    let title = priority_re().replace_all(input, "");
    let title = marker_re().replace_all(&title, "");
    let title = hours_re().replace_all(&title, "");

    ParsedTask {
        title: collapse(&title),
        priority,
        company,
        hours,
    }
}

#[derive(Debug, PartialEq)]
pub struct ParsedShift {
    pub employee_id: Option<String>,
    pub day: Option<u8>,
    pub times: Option<(String, String)>,
    pub shift_type: Option<ShiftType>,
    pub notes: String,
}

impl ParsedShift {
    /// Missing type means morning, missing times the type's usual hours.
    pub fn into_new_shift(self, default_day: u8) -> NewShift {
        let shift_type = self.shift_type.unwrap_or_default();
        let mut new_shift = NewShift::typed(
            self.employee_id.unwrap_or_default(),
            self.day.unwrap_or(default_day),
            shift_type,
        );
        if let Some((start, end)) = self.times {
            new_shift.start_time = start;
            new_shift.end_time = end;
        }
        new_shift.notes = (!self.notes.is_empty()).then_some(self.notes);
        new_shift
    }
}

// Indexed from Sunday
const DAY_PREFIXES: [&str; 7] = ["do", "lu", "ma", "mi", "ju", "vi", "s"];

fn day_index(name: &str) -> Option<u8> {
    let name = name.to_lowercase();
    DAY_PREFIXES
        .iter()
        .position(|prefix| name.starts_with(prefix))
        .map(|i| i as u8)
}

fn pad_time(time: &str) -> String {
    format!("{:0>5}", time)
}

pub fn parse_shift_input(input: &str) -> ParsedShift {
    let employee_id = marker_re().captures(input).map(|caps| caps[1].to_string());

    let day = day_re()
        .captures(input)
        .and_then(|caps| day_index(&caps[1]));

    let times = time_range_re()
        .captures(input)
        .map(|caps| (pad_time(&caps[1]), pad_time(&caps[2])));

    let shift_type = shift_type_re()
        .captures(input)
        .and_then(|caps| ShiftType::from_keyword(&caps[1]));

    let notes = marker_re().replace_all(input, "");
    let notes = day_re().replace(&notes, "");
    let notes = time_range_re().replace(&notes, "");
    let notes = shift_type_re().replace(&notes, "");

    ParsedShift {
        employee_id,
        day,
        times,
        shift_type,
        notes: collapse(&notes),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_title() {
        let input = "Inventario de almacén";
        let expected = ParsedTask {
            title: "Inventario de almacén".to_string(),
            priority: None,
            company: None,
            hours: None,
        };
        assert_eq!(parse_task_input(input), expected);
    }

    #[test]
    fn test_parse_with_priority_in_middle() {
        let input = "Revisar !alta planos arquitectónicos";
        let expected = ParsedTask {
            title: "Revisar planos arquitectónicos".to_string(),
            priority: Some(Priority::High),
            company: None,
            hours: None,
        };
        assert_eq!(parse_task_input(input), expected);
    }

    #[test]
    fn test_parse_all_markers() {
        let input = "Auditoría de calidad @Constructora_del_Norte ~5h !media";
        let expected = ParsedTask {
            title: "Auditoría de calidad".to_string(),
            priority: Some(Priority::Medium),
            company: Some("Constructora del Norte".to_string()),
            hours: Some(5.0),
        };
        assert_eq!(parse_task_input(input), expected);
    }

    #[test]
    fn test_parse_fractional_hours_without_suffix() {
        let input = "Reunión ~1.5 con cliente";
        let result = parse_task_input(input);
        assert_eq!(result.title, "Reunión con cliente");
        assert_eq!(result.hours, Some(1.5));
    }

    #[test]
    fn test_parse_with_multiple_priorities_and_spaces() {
        let input = "  !baja  !alta Capacitación    de personal !media nuevo ";
        let expected = ParsedTask {
            title: "Capacitación de personal nuevo".to_string(),
            priority: Some(Priority::Low),
            company: None,
            hours: None,
        };
        assert_eq!(parse_task_input(input), expected);
    }

    #[test]
    fn test_parse_with_unknown_priority_keeps_text() {
        let input = "Revisar logs !urgente";
        let result = parse_task_input(input);
        assert_eq!(result.title, "Revisar logs !urgente");
        assert_eq!(result.priority, None);
    }

    #[test]
    fn test_parse_priority_is_case_insensitive() {
        let result = parse_task_input("!ALTA Migración");
        assert_eq!(result.priority, Some(Priority::High));
        assert_eq!(result.title, "Migración");
    }

    #[test]
    fn test_parse_shift_all_markers() {
        let input = "@e2 martes 14:00-22:00 !vespertino cubrir caja";
        let expected = ParsedShift {
            employee_id: Some("e2".to_string()),
            day: Some(2),
            times: Some(("14:00".to_string(), "22:00".to_string())),
            shift_type: Some(ShiftType::Afternoon),
            notes: "cubrir caja".to_string(),
        };
        assert_eq!(parse_shift_input(input), expected);
    }

    #[test]
    fn test_parse_shift_accented_day_and_short_times() {
        let result = parse_shift_input("Sábado @e5 9:00-13:30");
        assert_eq!(result.day, Some(6));
        assert_eq!(
            result.times,
            Some(("09:00".to_string(), "13:30".to_string()))
        );
        assert_eq!(result.notes, "");
        assert_eq!(parse_shift_input("miercoles @e1").day, Some(3));
    }

    #[test]
    fn test_shift_defaults_from_type() {
        let new_shift = parse_shift_input("@e3 !nocturno").into_new_shift(4);
        let expected = NewShift {
            employee_id: "e3".to_string(),
            day: 4,
            start_time: "22:00".to_string(),
            end_time: "06:00".to_string(),
            shift_type: ShiftType::Night,
            notes: None,
        };
        assert_eq!(new_shift, expected);

        let untyped = parse_shift_input("lunes inventario").into_new_shift(0);
        assert_eq!(untyped.shift_type, ShiftType::Morning);
        assert_eq!(untyped.employee_id, "");
        assert_eq!(untyped.notes.as_deref(), Some("inventario"));
    }
}
