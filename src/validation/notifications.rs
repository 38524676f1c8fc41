use super::{one_of_message, Checker, FieldError, Validate};
use crate::models::{CreateNotificationRequest, NewNotification, NotificationType, Priority};

impl Validate for CreateNotificationRequest {
    type Output = NewNotification;

    fn validate(self) -> Result<NewNotification, Vec<FieldError>> {
        let mut c = Checker::new();

        let types: Vec<_> = NotificationType::ALL.iter().map(|t| t.as_str()).collect();
        let kind = c.one_of("type", self.kind.as_deref(), &one_of_message("Type", &types));
        let title = c.present("title", self.title.as_deref(), "Title is required");
        c.optional_text("title", self.title.as_deref(), 200, "Title must not exceed 200 characters");
        let description = c
            .optional_text("description", self.description.as_deref(), 1000, "Description must not exceed 1000 characters")
            .unwrap_or_default();
        let priority = match self.priority.as_deref() {
            Some(p) => {
                let priorities: Vec<_> = Priority::ALL.iter().map(|p| p.as_str()).collect();
                c.one_of("priority", Some(p), &one_of_message("Priority", &priorities))
            }
            None => Some(Priority::Medium),
        };
        let user_id = c.present("userId", self.user_id.as_deref(), "User ID is required");

        c.finish(|| {
            Some(NewNotification {
                kind: kind?,
                title: title?,
                description,
                priority: priority?,
                user_id: user_id?,
                read: self.read.unwrap_or(false),
                metadata: self.metadata,
            })
        })
    }
}
